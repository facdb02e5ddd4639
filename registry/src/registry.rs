//! The service container and the per-thread active registry pointer.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::key::ServiceKey;
use crate::service::{Injectable, Service};
use crate::table::{registrations, Binding, RegistrationTable};

thread_local! {
  // The registry `Resolve` cells read from when no registry is passed explicitly.
  static ACTIVE: RefCell<Option<Rc<ServiceRegistry>>> = RefCell::new(None);
}

/// Returns the registry installed on the current thread, if any.
pub fn active() -> Option<Rc<ServiceRegistry>> {
  ACTIVE.with(|active| active.borrow().clone())
}

enum Source {
  Global,
  Table(RegistrationTable),
}

/// The service container.
///
/// A registry materializes the bindings of a [`RegistrationTable`]: eager
/// services during [`initialize`](Self::initialize), lazy ones on their first
/// [`get`](Self::get). Each key is produced at most once per registry and the
/// same `Rc` is handed out on every later lookup.
///
/// The registry is single-threaded. Factories receive `&ServiceRegistry` and
/// may look up other services while they run.
pub struct ServiceRegistry {
  source: Source,
  instances: RefCell<HashMap<ServiceKey, Service>>,
  factories: RefCell<HashMap<ServiceKey, Binding>>,
  // Bumped by every `destroy`.
  teardowns: Cell<u64>,
}

impl ServiceRegistry {
  fn with_source(source: Source) -> Self {
    Self {
      source,
      instances: RefCell::new(HashMap::new()),
      factories: RefCell::new(HashMap::new()),
      teardowns: Cell::new(0),
    }
  }

  /// Creates a registry over the process-wide table and installs it as the
  /// active registry of this thread, replacing any previous one.
  pub fn new() -> Rc<Self> {
    let registry = Rc::new(Self::with_source(Source::Global));
    registry.install();
    registry
  }

  /// Creates a registry over an explicitly built table. The registry is not
  /// installed; pass it to [`Resolve::get_from`](crate::Resolve::get_from) or
  /// call [`install`](Self::install).
  pub fn from_table(table: RegistrationTable) -> Rc<Self> {
    Rc::new(Self::with_source(Source::Table(table)))
  }

  /// Makes this registry the one `Resolve` cells on this thread read from.
  pub fn install(self: &Rc<Self>) {
    ACTIVE.with(|active| *active.borrow_mut() = Some(Rc::clone(self)));
    tracing::debug!("service registry installed");
  }

  pub fn is_active(self: &Rc<Self>) -> bool {
    active().is_some_and(|current| Rc::ptr_eq(&current, self))
  }

  /// Materializes every eager binding and queues every lazy one.
  ///
  /// Eager services are built in table insertion order. A factory that looks
  /// up a service which is still pending builds it on the spot.
  pub fn initialize(&self) -> Result<()> {
    let table: Cow<'_, RegistrationTable> = match &self.source {
      Source::Global => Cow::Owned(registrations().snapshot()),
      Source::Table(table) => Cow::Borrowed(table),
    };

    {
      let instances = self.instances.borrow();
      let mut factories = self.factories.borrow_mut();
      for binding in table.bindings() {
        if !instances.contains_key(binding.key()) {
          factories.insert(binding.key().clone(), binding.clone());
        }
      }
    }

    for binding in table.eager() {
      if !self.is_materialized(binding.key()) {
        self.materialize(binding.key())?;
      }
    }

    tracing::debug!(
      eager = table.eager().len(),
      lazy = table.lazy().len(),
      "service registry initialized"
    );
    Ok(())
  }

  /// Returns the service stored under `key`, producing it first if it is
  /// still pending.
  pub fn get<T: Injectable>(&self, key: impl Into<ServiceKey>) -> Result<Rc<T>> {
    let key = key.into();
    let cached = self.instances.borrow().get(&key).cloned();
    let service = match cached {
      Some(service) => {
        tracing::trace!(key = %key, "service cache hit");
        service
      }
      None => self.materialize(&key)?,
    };
    service.downcast::<T>(&key)
  }

  /// Looks up `T` under the default name.
  pub fn resolve<T: Injectable>(&self) -> Result<Rc<T>> {
    self.get(ServiceKey::of::<T>())
  }

  /// Looks up `T` under `name`.
  pub fn resolve_named<T: Injectable>(&self, name: &str) -> Result<Rc<T>> {
    self.get(ServiceKey::named::<T>(name))
  }

  fn materialize(&self, key: &ServiceKey) -> Result<Service> {
    let binding = self.factories.borrow_mut().remove(key);
    let Some(binding) = binding else {
      tracing::warn!(key = %key, "no service registered");
      return Err(Error::ServiceNotFound { key: key.clone() });
    };

    tracing::debug!(key = %key, method = binding.method(), "materializing service");
    let teardowns = self.teardowns.get();
    match binding.produce(self) {
      Ok(service) if self.teardowns.get() != teardowns => {
        // The registry was destroyed while the factory ran.
        tracing::warn!(key = %key, "registry destroyed during materialization");
        service.dispose();
        Err(Error::ServiceNotFound { key: key.clone() })
      }
      Ok(service) => {
        self
          .instances
          .borrow_mut()
          .insert(key.clone(), service.clone());
        Ok(service)
      }
      Err(err) => {
        // A failed factory leaves the key pending, unless teardown ran meanwhile.
        if self.teardowns.get() == teardowns {
          self.factories.borrow_mut().insert(key.clone(), binding);
        }
        Err(err)
      }
    }
  }

  /// Whether `key` is materialized or pending.
  pub fn contains(&self, key: impl Into<ServiceKey>) -> bool {
    let key = key.into();
    self.instances.borrow().contains_key(&key) || self.factories.borrow().contains_key(&key)
  }

  pub fn is_materialized(&self, key: &ServiceKey) -> bool {
    self.instances.borrow().contains_key(key)
  }

  /// Number of materialized services.
  pub fn len(&self) -> usize {
    self.instances.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.instances.borrow().is_empty()
  }

  /// Disposes every materialized service and drops all pending factories.
  ///
  /// The registration table and the active registry pointer are left as they
  /// are, so later lookups fail with [`Error::ServiceNotFound`]. A factory
  /// that is running when `destroy` is called has its product disposed
  /// instead of stored, and its lookup fails the same way.
  pub fn destroy(&self) {
    self.teardowns.set(self.teardowns.get() + 1);
    let disposed: Vec<Service> = self
      .instances
      .borrow_mut()
      .drain()
      .map(|(_, service)| service)
      .collect();
    self.factories.borrow_mut().clear();

    for service in &disposed {
      service.dispose();
    }
    tracing::debug!(disposed = disposed.len(), "service registry destroyed");
  }
}

impl fmt::Debug for ServiceRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let source = match self.source {
      Source::Global => "global",
      Source::Table(_) => "table",
    };
    f.debug_struct("ServiceRegistry")
      .field("source", &source)
      .field("instances", &self.instances.borrow().len())
      .field("factories", &self.factories.borrow().len())
      .finish()
  }
}
