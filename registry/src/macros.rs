//! Declarative registration and one-off resolution.

/// Declares a function as a service factory in the process-wide table.
///
/// The binding is recorded by a start-up constructor, before `main` runs, so
/// it is in place before any [`ServiceRegistry`](crate::ServiceRegistry)
/// exists. The factory must have the signature
/// `fn(&ServiceRegistry) -> fibre_registry::Result<T>` and stays callable as
/// an ordinary function.
///
/// ```ignore
/// register!(make_logger -> Logger);
/// register!(make_cache -> Cache, lazy);
/// register!(make_replica -> Database, name = "replica");
/// register!(make_archive -> Database, name = "archive", lazy);
/// ```
///
/// # Panics
///
/// A reused method name or service key aborts the process at start-up.
#[cfg(feature = "declarative")]
#[macro_export]
macro_rules! register {
  (@record $method:ident, $type:ty, $options:expr) => {
    const _: () = {
      #[$crate::__private::ctor]
      fn record_binding() {
        if let Err(err) =
          $crate::registrations().register::<$type>(stringify!($method), $options, $method)
        {
          panic!("{}", err);
        }
      }
    };
  };

  ($method:ident -> $type:ty) => {
    $crate::register!(@record $method, $type, $crate::RegisterOptions::new());
  };

  ($method:ident -> $type:ty, lazy) => {
    $crate::register!(@record $method, $type, $crate::RegisterOptions::new().lazy(true));
  };

  ($method:ident -> $type:ty, name = $name:expr) => {
    $crate::register!(@record $method, $type, $crate::RegisterOptions::new().name($name));
  };

  ($method:ident -> $type:ty, name = $name:expr, lazy) => {
    $crate::register!(
      @record $method,
      $type,
      $crate::RegisterOptions::new().name($name).lazy(true)
    );
  };
}

/// Looks a service up in the thread's active registry.
///
/// Evaluates to `Result<Rc<T>>`: [`Error::NotReady`](crate::Error::NotReady)
/// without an active registry, otherwise whatever
/// [`ServiceRegistry::get`](crate::ServiceRegistry::get) returns. Nothing is
/// cached; use [`Resolve`](crate::Resolve) for a memoizing field.
///
/// # Examples
///
/// ```
/// use fibre_registry::{resolve, Error, Injectable};
///
/// struct Mailer;
/// impl Injectable for Mailer {}
///
/// // No registry has been installed on this thread yet.
/// assert!(matches!(resolve!(Mailer), Err(Error::NotReady { .. })));
/// ```
#[macro_export]
macro_rules! resolve {
  ($type:ty) => {
    $crate::active()
      .ok_or_else(|| $crate::Error::NotReady {
        key: $crate::ServiceKey::of::<$type>(),
      })
      .and_then(|registry| registry.resolve::<$type>())
  };

  ($type:ty, $name:expr) => {
    $crate::active()
      .ok_or_else(|| $crate::Error::NotReady {
        key: $crate::ServiceKey::named::<$type>($name),
      })
      .and_then(|registry| registry.resolve_named::<$type>($name))
  };
}
