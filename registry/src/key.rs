//! Service keys of the form `Owner::name`.

use std::any;
use std::borrow::Borrow;
use std::fmt;

/// The name used when a binding or resolution does not supply one.
pub const DEFAULT_NAME: &str = "default";

/// Identifies one service slot: `<OwningType>::<Name>`.
///
/// The owning type is the unqualified type name, so `app::log::Logger`
/// registered without a name becomes `Logger::default`. Service types are
/// expected to be named types (structs, enums, trait objects); tuples, slices
/// and arrays do not have a meaningful unqualified name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceKey(String);

impl ServiceKey {
  /// The key of `T` under the default name.
  pub fn of<T: ?Sized + 'static>() -> Self {
    Self::named::<T>(DEFAULT_NAME)
  }

  /// The key of `T` under `name`.
  pub fn named<T: ?Sized + 'static>(name: &str) -> Self {
    Self(format!("{}::{}", short_type_name::<T>(), name))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

/// Strips references, `dyn`, the module path and generic arguments from
/// `type_name::<T>()`. Only named types produce a clean owner.
pub(crate) fn short_type_name<T: ?Sized + 'static>() -> &'static str {
  let full = any::type_name::<T>();
  let base = match full.find('<') {
    Some(idx) => &full[..idx],
    None => full,
  };
  let base = base.trim_start_matches('&').trim_start_matches("mut ");
  let base = base.trim_start_matches("dyn ");
  base.rsplit("::").next().unwrap_or(base)
}

impl fmt::Display for ServiceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl fmt::Debug for ServiceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ServiceKey({})", self.0)
  }
}

impl From<&str> for ServiceKey {
  fn from(key: &str) -> Self {
    Self(key.to_owned())
  }
}

impl From<String> for ServiceKey {
  fn from(key: String) -> Self {
    Self(key)
  }
}

impl From<&ServiceKey> for ServiceKey {
  fn from(key: &ServiceKey) -> Self {
    key.clone()
  }
}

impl Borrow<str> for ServiceKey {
  fn borrow(&self) -> &str {
    &self.0
  }
}
