use fibre_registry::{
  Error, Injectable, RegisterOptions, RegistrationTable, Resolve, Result, ServiceKey,
  ServiceRegistry,
};
use std::cell::Cell;
use std::rc::Rc;

// --- Test Fixtures ---

thread_local! {
  static MAILER_BUILDS: Cell<usize> = Cell::new(0);
}

#[derive(Debug)]
struct Mailer {
  sender: &'static str,
}
impl Injectable for Mailer {}

#[derive(Debug)]
struct Clock;
impl Injectable for Clock {}

fn make_mailer(_: &ServiceRegistry) -> Result<Mailer> {
  MAILER_BUILDS.with(|c| c.set(c.get() + 1));
  Ok(Mailer { sender: "noreply@example.com" })
}

fn make_alerts_mailer(_: &ServiceRegistry) -> Result<Mailer> {
  Ok(Mailer { sender: "alerts@example.com" })
}

fn make_clock(_: &ServiceRegistry) -> Result<Clock> {
  Ok(Clock)
}

fn mailer_registry() -> Rc<ServiceRegistry> {
  let mut table = RegistrationTable::new();
  table
    .register("make_mailer", RegisterOptions::new().lazy(true), make_mailer)
    .unwrap()
    .register("make_alerts_mailer", RegisterOptions::new().name("alerts"), make_alerts_mailer)
    .unwrap()
    .register("make_clock", RegisterOptions::new(), make_clock)
    .unwrap();
  ServiceRegistry::from_table(table)
}

// A consumer with resolved dependencies as fields.
#[derive(Default)]
struct Notifier {
  mailer: Resolve<Mailer>,
}

struct AlertNotifier {
  mailer: Resolve<Mailer>,
}

impl AlertNotifier {
  fn new() -> Self {
    Self {
      mailer: Resolve::named("alerts"),
    }
  }
}

// --- Tests ---

#[test]
fn test_read_before_any_registry_is_not_ready() {
  let notifier = Notifier::default();

  let err = notifier.mailer.get().unwrap_err();

  assert_eq!(
    err,
    Error::NotReady {
      key: ServiceKey::from("Mailer::default")
    }
  );
  assert!(!notifier.mailer.is_resolved());
}

#[test]
fn test_first_read_resolves_and_caches() {
  // Arrange
  let registry = mailer_registry();
  registry.initialize().unwrap();
  registry.install();
  let notifier = Notifier::default();
  assert_eq!(MAILER_BUILDS.with(Cell::get), 0);

  // Act
  let m1 = Rc::clone(notifier.mailer.get().unwrap());
  let m2 = Rc::clone(notifier.mailer.get().unwrap());

  // Assert
  assert_eq!(m1.sender, "noreply@example.com");
  assert!(Rc::ptr_eq(&m1, &m2));
  assert_eq!(MAILER_BUILDS.with(Cell::get), 1);
}

#[test]
fn test_each_owner_resolves_independently() {
  let registry = mailer_registry();
  registry.initialize().unwrap();
  registry.install();
  let first = Notifier::default();
  let second = Notifier::default();

  first.mailer.get().unwrap();

  assert!(first.mailer.is_resolved());
  assert!(!second.mailer.is_resolved());
  assert!(Rc::ptr_eq(
    first.mailer.get().unwrap(),
    second.mailer.get().unwrap()
  ));
  assert_eq!(MAILER_BUILDS.with(Cell::get), 1);
}

#[test]
fn test_named_field_resolves_the_named_binding() {
  let registry = mailer_registry();
  registry.initialize().unwrap();
  registry.install();

  let notifier = AlertNotifier::new();

  assert_eq!(notifier.mailer.key().as_str(), "Mailer::alerts");
  assert_eq!(notifier.mailer.get().unwrap().sender, "alerts@example.com");
}

#[test]
fn test_unregistered_field_is_not_found_and_stays_unresolved() {
  let registry = mailer_registry();
  registry.initialize().unwrap();
  registry.install();
  let field: Resolve<Mailer> = Resolve::named("marketing");

  let err = field.get().unwrap_err();

  assert_eq!(
    err,
    Error::ServiceNotFound {
      key: ServiceKey::from("Mailer::marketing")
    }
  );
  assert!(!field.is_resolved());
}

#[test]
fn test_resolved_field_survives_destroy() {
  // Arrange
  let registry = mailer_registry();
  registry.initialize().unwrap();
  registry.install();
  let resolved = Notifier::default();
  resolved.mailer.get().unwrap();
  let unresolved = Notifier::default();

  // Act
  registry.destroy();

  // Assert: the cached value needs no registry; a fresh read reaches the emptied one.
  assert_eq!(resolved.mailer.get().unwrap().sender, "noreply@example.com");
  assert!(matches!(
    unresolved.mailer.get(),
    Err(Error::ServiceNotFound { .. })
  ));
}

#[test]
fn test_get_from_uses_the_explicit_registry() {
  // Arrange: one registry is active, another is passed explicitly.
  let installed = mailer_registry();
  installed.initialize().unwrap();
  installed.install();
  let explicit = mailer_registry();
  explicit.initialize().unwrap();
  let notifier = Notifier::default();

  // Act
  let mailer = Rc::clone(notifier.mailer.get_from(&explicit).unwrap());

  // Assert
  assert!(explicit.is_materialized(&ServiceKey::of::<Mailer>()));
  assert!(!installed.is_materialized(&ServiceKey::of::<Mailer>()));
  assert!(Rc::ptr_eq(&mailer, notifier.mailer.get().unwrap()));
}

#[test]
fn test_new_registry_replaces_the_active_one_for_unresolved_fields() {
  let first = mailer_registry();
  first.initialize().unwrap();
  first.install();
  let early = Notifier::default();
  early.mailer.get().unwrap();

  let second = mailer_registry();
  second.initialize().unwrap();
  second.install();
  let late = Notifier::default();

  assert!(!Rc::ptr_eq(early.mailer.get().unwrap(), late.mailer.get().unwrap()));
  assert!(Rc::ptr_eq(
    late.mailer.get().unwrap(),
    &second.resolve::<Mailer>().unwrap()
  ));
}
