use thiserror::Error;

use crate::key::ServiceKey;

/// The error type for registration and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A factory function name was registered twice. Method names share one
  /// namespace across every service type.
  #[error("Service factory method '{method}' already registered.")]
  DuplicateMethod { method: String },

  /// Two bindings resolve to the same `Owner::name` key.
  #[error("Service key '{key}' is already registered. Use a different name.")]
  DuplicateKey { key: ServiceKey },

  /// A resolution cell was read while no registry was active on this thread.
  #[error("'{key}' cannot be accessed before a ServiceRegistry is ready.")]
  NotReady { key: ServiceKey },

  /// Neither a materialized instance nor a pending factory exists for the key.
  #[error("No instance found for '{key}'.")]
  ServiceNotFound { key: ServiceKey },

  /// The instance stored under the key is not of the requested type.
  #[error("Service '{key}' is not a '{expected}'.")]
  TypeMismatch {
    key: ServiceKey,
    expected: &'static str,
  },
}

/// A specialized `Result` type for `fibre_registry` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
