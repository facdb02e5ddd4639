//! Field cells that resolve a service on first read.

use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;

use crate::error::{Error, Result};
use crate::key::{ServiceKey, DEFAULT_NAME};
use crate::registry::{self, ServiceRegistry};
use crate::service::Injectable;

/// A lazily resolved dependency, meant to be stored as a struct field.
///
/// The first successful read looks the service up and caches the `Rc`; every
/// later read returns the cached value without touching a registry. Each
/// owning value resolves independently.
///
/// # Examples
///
/// ```
/// use fibre_registry::{Injectable, RegisterOptions, RegistrationTable, Resolve, ServiceRegistry};
///
/// struct Logger;
/// impl Injectable for Logger {}
///
/// struct Handler {
///   logger: Resolve<Logger>,
/// }
///
/// let mut table = RegistrationTable::new();
/// table
///   .register("make_logger", RegisterOptions::new(), |_| Ok(Logger))
///   .unwrap();
/// let registry = ServiceRegistry::from_table(table);
/// registry.initialize().unwrap();
///
/// let handler = Handler { logger: Resolve::new() };
/// assert!(handler.logger.get_from(&registry).is_ok());
/// assert!(handler.logger.is_resolved());
/// ```
pub struct Resolve<T> {
  name: String,
  cell: OnceCell<Rc<T>>,
}

impl<T: Injectable> Resolve<T> {
  /// Resolves `T` under the default name.
  pub fn new() -> Self {
    Self::named(DEFAULT_NAME)
  }

  /// Resolves `T` under `name`.
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      cell: OnceCell::new(),
    }
  }

  pub fn key(&self) -> ServiceKey {
    ServiceKey::named::<T>(&self.name)
  }

  /// Reads the service from the thread's active registry.
  ///
  /// Fails with [`Error::NotReady`] when no registry has been installed.
  pub fn get(&self) -> Result<&Rc<T>> {
    self.cell.get_or_try_init(|| {
      let key = self.key();
      let registry = registry::active().ok_or_else(|| Error::NotReady { key: key.clone() })?;
      registry.get(key)
    })
  }

  /// Reads the service from `registry` instead of the active one.
  pub fn get_from(&self, registry: &ServiceRegistry) -> Result<&Rc<T>> {
    self.cell.get_or_try_init(|| registry.get(self.key()))
  }

  pub fn is_resolved(&self) -> bool {
    self.cell.get().is_some()
  }
}

impl<T: Injectable> Default for Resolve<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Injectable> fmt::Debug for Resolve<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Resolve")
      .field("key", &self.key())
      .field("resolved", &self.is_resolved())
      .finish()
  }
}
