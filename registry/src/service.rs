//! The capability contract for registered services and its erased storage form.

use std::any::{self, Any};
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::key::ServiceKey;

/// Implemented by every type a registry can produce.
///
/// The only capability is an optional disposal hook, called once from
/// [`ServiceRegistry::destroy`](crate::ServiceRegistry::destroy).
pub trait Injectable: Any {
  /// Releases resources held by the service. Does nothing by default.
  fn on_dispose(&self) {}
}

/// A materialized service with its concrete type erased.
///
/// Both handles point at the same allocation: `instance` is used for typed
/// downcasts, `hook` for disposal.
#[derive(Clone)]
pub(crate) struct Service {
  instance: Rc<dyn Any>,
  hook: Rc<dyn Injectable>,
  type_name: &'static str,
}

impl Service {
  pub(crate) fn new<T: Injectable>(value: T) -> Self {
    let rc = Rc::new(value);
    Self {
      instance: rc.clone(),
      hook: rc,
      type_name: any::type_name::<T>(),
    }
  }

  pub(crate) fn downcast<T: Injectable>(&self, key: &ServiceKey) -> Result<Rc<T>> {
    Rc::clone(&self.instance)
      .downcast::<T>()
      .map_err(|_| Error::TypeMismatch {
        key: key.clone(),
        expected: any::type_name::<T>(),
      })
  }

  pub(crate) fn dispose(&self) {
    self.hook.on_dispose();
  }
}

impl fmt::Debug for Service {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Service({})", self.type_name)
  }
}
