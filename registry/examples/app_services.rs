use fibre_registry::{register, Injectable, Resolve, Result, ServiceRegistry};
use std::cell::RefCell;

// --- Services ---

#[derive(Default)]
struct Logger {
  lines: RefCell<Vec<String>>,
}

impl Logger {
  fn log(&self, line: impl Into<String>) {
    self.lines.borrow_mut().push(line.into());
  }
}

impl Injectable for Logger {
  fn on_dispose(&self) {
    println!("logger flushed {} lines", self.lines.borrow().len());
  }
}

struct Cache {
  entries: RefCell<Vec<(String, String)>>,
}

impl Injectable for Cache {
  fn on_dispose(&self) {
    println!("cache dropped {} entries", self.entries.borrow().len());
  }
}

// --- Factories ---

fn make_logger(_: &ServiceRegistry) -> Result<Logger> {
  println!("building logger");
  Ok(Logger::default())
}

fn make_cache(registry: &ServiceRegistry) -> Result<Cache> {
  println!("building cache");
  registry.resolve::<Logger>()?.log("cache created");
  Ok(Cache {
    entries: RefCell::new(Vec::new()),
  })
}

register!(make_logger -> Logger);
register!(make_cache -> Cache, lazy);

// --- Consumer ---

struct SessionStore {
  cache: Resolve<Cache>,
  logger: Resolve<Logger>,
}

impl SessionStore {
  fn put(&self, id: &str, user: &str) -> Result<()> {
    self
      .cache
      .get()?
      .entries
      .borrow_mut()
      .push((id.to_owned(), user.to_owned()));
    self.logger.get()?.log(format!("stored session {}", id));
    Ok(())
  }
}

fn main() -> Result<()> {
  let registry = ServiceRegistry::new();
  registry.initialize()?;
  println!("initialized; cache built yet? {}", registry.len() > 1);

  let store = SessionStore {
    cache: Resolve::new(),
    logger: Resolve::new(),
  };
  store.put("s-1", "ada")?;
  store.put("s-2", "grace")?;

  registry.destroy();
  Ok(())
}
