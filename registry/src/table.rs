//! Declared factory bindings, split into eager and lazy partitions.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::key::{ServiceKey, DEFAULT_NAME};
use crate::registry::ServiceRegistry;
use crate::service::{Injectable, Service};

type ErasedFactory = Arc<dyn Fn(&ServiceRegistry) -> Result<Service> + Send + Sync>;

/// Options accepted when registering a factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterOptions {
  pub name: String,
  pub lazy: bool,
}

impl Default for RegisterOptions {
  fn default() -> Self {
    Self {
      name: DEFAULT_NAME.to_owned(),
      lazy: false,
    }
  }
}

impl RegisterOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  pub fn lazy(mut self, lazy: bool) -> Self {
    self.lazy = lazy;
    self
  }
}

/// One factory bound to one service key.
#[derive(Clone)]
pub struct Binding {
  method: String,
  key: ServiceKey,
  lazy: bool,
  factory: ErasedFactory,
}

impl Binding {
  /// Binds `factory`, known as `method`, to the key of `T` under `options.name`.
  pub fn new<T: Injectable>(
    method: impl Into<String>,
    options: RegisterOptions,
    factory: fn(&ServiceRegistry) -> Result<T>,
  ) -> Self {
    Self {
      method: method.into(),
      key: ServiceKey::named::<T>(&options.name),
      lazy: options.lazy,
      factory: Arc::new(move |registry: &ServiceRegistry| {
        factory(registry).map(Service::new)
      }),
    }
  }

  pub fn method(&self) -> &str {
    &self.method
  }

  pub fn key(&self) -> &ServiceKey {
    &self.key
  }

  pub fn is_lazy(&self) -> bool {
    self.lazy
  }

  pub(crate) fn produce(&self, registry: &ServiceRegistry) -> Result<Service> {
    (self.factory)(registry)
  }
}

impl fmt::Debug for Binding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Binding")
      .field("method", &self.method)
      .field("key", &self.key)
      .field("lazy", &self.lazy)
      .finish_non_exhaustive()
  }
}

/// An append-only set of bindings.
///
/// Each method name and each key appears at most once across both partitions.
/// Bindings keep their insertion order, which is the order eager services are
/// materialized in.
#[derive(Debug, Clone, Default)]
pub struct RegistrationTable {
  eager: Vec<Binding>,
  lazy: Vec<Binding>,
}

impl RegistrationTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a binding, rejecting a reused method name or key.
  pub fn record(&mut self, binding: Binding) -> Result<()> {
    if self.contains_method(binding.method()) {
      tracing::warn!(method = binding.method(), "rejected duplicate factory method");
      return Err(Error::DuplicateMethod {
        method: binding.method,
      });
    }
    if self.contains_key(binding.key()) {
      tracing::warn!(key = %binding.key(), "rejected duplicate service key");
      return Err(Error::DuplicateKey { key: binding.key });
    }

    tracing::debug!(
      method = binding.method(),
      key = %binding.key(),
      lazy = binding.lazy,
      "recorded service binding"
    );
    if binding.lazy {
      self.lazy.push(binding);
    } else {
      self.eager.push(binding);
    }
    Ok(())
  }

  /// Typed front end for [`record`](Self::record). Chains for builder-style use.
  pub fn register<T: Injectable>(
    &mut self,
    method: &str,
    options: RegisterOptions,
    factory: fn(&ServiceRegistry) -> Result<T>,
  ) -> Result<&mut Self> {
    self.record(Binding::new(method, options, factory))?;
    Ok(self)
  }

  pub fn eager(&self) -> &[Binding] {
    &self.eager
  }

  pub fn lazy(&self) -> &[Binding] {
    &self.lazy
  }

  pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
    self.eager.iter().chain(self.lazy.iter())
  }

  pub fn contains_method(&self, method: &str) -> bool {
    self.bindings().any(|b| b.method == method)
  }

  pub fn contains_key(&self, key: &ServiceKey) -> bool {
    self.bindings().any(|b| &b.key == key)
  }

  pub fn len(&self) -> usize {
    self.eager.len() + self.lazy.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// The process-wide registration table shared by every registry built with
/// [`ServiceRegistry::new`].
///
/// Entries are never removed.
pub struct Registrations {
  table: RwLock<RegistrationTable>,
}

impl Registrations {
  pub fn record(&self, binding: Binding) -> Result<()> {
    self.table.write().record(binding)
  }

  pub fn register<T: Injectable>(
    &self,
    method: &str,
    options: RegisterOptions,
    factory: fn(&ServiceRegistry) -> Result<T>,
  ) -> Result<()> {
    self.record(Binding::new(method, options, factory))
  }

  pub fn contains_method(&self, method: &str) -> bool {
    self.table.read().contains_method(method)
  }

  pub fn contains_key(&self, key: &ServiceKey) -> bool {
    self.table.read().contains_key(key)
  }

  pub fn len(&self) -> usize {
    self.table.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.table.read().is_empty()
  }

  /// A copy of the current bindings.
  pub fn snapshot(&self) -> RegistrationTable {
    self.table.read().clone()
  }
}

static REGISTRATIONS: Lazy<Registrations> = Lazy::new(|| Registrations {
  table: RwLock::new(RegistrationTable::new()),
});

/// Provides the process-wide registration table.
///
/// # Examples
///
/// ```
/// use fibre_registry::{registrations, Injectable, RegisterOptions, ServiceRegistry};
///
/// struct Clock;
/// impl Injectable for Clock {}
///
/// fn make_clock(_: &ServiceRegistry) -> fibre_registry::Result<Clock> {
///   Ok(Clock)
/// }
///
/// registrations()
///   .register("make_clock", RegisterOptions::new(), make_clock)
///   .unwrap();
/// ```
pub fn registrations() -> &'static Registrations {
  &REGISTRATIONS
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Logger;
  impl Injectable for Logger {}

  struct Cache;
  impl Injectable for Cache {}

  fn make_logger(_: &ServiceRegistry) -> Result<Logger> {
    Ok(Logger)
  }

  fn make_cache(_: &ServiceRegistry) -> Result<Cache> {
    Ok(Cache)
  }

  #[test]
  fn bindings_are_partitioned_by_laziness() {
    let mut table = RegistrationTable::new();
    table
      .register("make_logger", RegisterOptions::new(), make_logger)
      .unwrap()
      .register("make_cache", RegisterOptions::new().lazy(true), make_cache)
      .unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.eager()[0].key().as_str(), "Logger::default");
    assert_eq!(table.lazy()[0].key().as_str(), "Cache::default");
    assert!(table.lazy()[0].is_lazy());
  }

  #[test]
  fn duplicate_method_is_rejected_across_types_and_partitions() {
    let mut table = RegistrationTable::new();
    table
      .register("make", RegisterOptions::new(), make_logger)
      .unwrap();

    let err = table
      .register("make", RegisterOptions::new().lazy(true), make_cache)
      .unwrap_err();

    assert_eq!(
      err,
      Error::DuplicateMethod {
        method: "make".to_owned()
      }
    );
    assert_eq!(table.len(), 1);
  }

  #[test]
  fn duplicate_key_is_rejected_across_partitions() {
    let mut table = RegistrationTable::new();
    table
      .register("make_logger", RegisterOptions::new(), make_logger)
      .unwrap();

    let err = table
      .register(
        "make_lazy_logger",
        RegisterOptions::new().name("default").lazy(true),
        make_logger,
      )
      .unwrap_err();

    assert_eq!(
      err,
      Error::DuplicateKey {
        key: ServiceKey::from("Logger::default")
      }
    );
  }

  #[test]
  fn distinct_names_on_one_type_coexist() {
    let mut table = RegistrationTable::new();
    table
      .register("make_app_logger", RegisterOptions::new(), make_logger)
      .unwrap()
      .register("make_audit_logger", RegisterOptions::new().name("audit"), make_logger)
      .unwrap();

    assert!(table.contains_key(&ServiceKey::named::<Logger>("audit")));
    assert!(table.contains_method("make_app_logger"));
    assert!(!table.contains_method("make_cache"));
  }
}
