//! # Fibre Registry
//!
//! A small, declarative service registry for Rust.
//!
//! Factory functions are bound to named service keys before any container
//! exists. A [`ServiceRegistry`] then materializes those bindings, eagerly
//! during [`initialize`](ServiceRegistry::initialize) or lazily on first
//! lookup, and hands out the same `Rc` for a key on every later lookup.
//!
//! ## Core Concepts
//!
//! - **Service key**: `Owner::name`, where `name` defaults to `"default"`.
//! - **Registration table**: the append-only set of bindings. One lives for the
//!   whole process ([`registrations()`]); others can be built explicitly.
//! - **Registry**: the container. [`ServiceRegistry::new`] reads the
//!   process-wide table and becomes the active registry of the thread.
//! - **Resolution**: [`Resolve<T>`] fields resolve on first read and cache the
//!   result; [`resolve!`] performs a one-off lookup.
//! - **Disposal**: [`Injectable::on_dispose`] runs for every materialized
//!   service in [`ServiceRegistry::destroy`].
//!
//! ## Quick Start
//!
//! ```
//! use fibre_registry::{Injectable, RegisterOptions, RegistrationTable, ServiceRegistry};
//! use std::rc::Rc;
//!
//! struct Logger;
//! impl Injectable for Logger {}
//!
//! struct Cache {
//!   logger: Rc<Logger>,
//! }
//! impl Injectable for Cache {}
//!
//! fn make_logger(_: &ServiceRegistry) -> fibre_registry::Result<Logger> {
//!   Ok(Logger)
//! }
//!
//! fn make_cache(registry: &ServiceRegistry) -> fibre_registry::Result<Cache> {
//!   Ok(Cache {
//!     logger: registry.resolve::<Logger>()?,
//!   })
//! }
//!
//! let mut table = RegistrationTable::new();
//! table
//!   .register("make_logger", RegisterOptions::new(), make_logger)?
//!   .register("make_cache", RegisterOptions::new().lazy(true), make_cache)?;
//!
//! let registry = ServiceRegistry::from_table(table);
//! registry.initialize()?;
//!
//! let cache = registry.get::<Cache>("Cache::default")?;
//! assert!(Rc::ptr_eq(&cache, &registry.get::<Cache>("Cache::default")?));
//! assert!(Rc::ptr_eq(&cache.logger, &registry.resolve::<Logger>()?));
//!
//! registry.destroy();
//! # Ok::<(), fibre_registry::Error>(())
//! ```

mod error;
mod key;
mod macros;
mod registry;
mod resolve;
mod service;
mod table;

pub use error::{Error, Result};
pub use key::{ServiceKey, DEFAULT_NAME};
pub use registry::{active, ServiceRegistry};
pub use resolve::Resolve;
pub use service::Injectable;
pub use table::{registrations, Binding, RegisterOptions, Registrations, RegistrationTable};

#[cfg(feature = "declarative")]
#[doc(hidden)]
pub mod __private {
  pub use ctor::ctor;
}
