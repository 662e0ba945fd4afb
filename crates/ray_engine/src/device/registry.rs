//! Name-keyed factories
//!
//! The device creates geometries, volumes, renderers and cameras by type
//! name. Each kind has its own registry, seeded with the built-in types and
//! open for applications to add their own.

use std::collections::HashMap;

/// Factory producing a fresh, uncommitted instance
pub type Factory<T> = fn() -> T;

/// Registry of factories for one object kind
pub struct Registry<T> {
    kind: &'static str,
    factories: HashMap<String, Factory<T>>,
}

impl<T> Registry<T> {
    /// Create an empty registry for objects of `kind`
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            factories: HashMap::new(),
        }
    }

    /// Object kind this registry creates, used in diagnostics
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Register `factory` under `name`
    ///
    /// Returns the factory previously registered under the same name, which
    /// the new one replaces.
    pub fn register(&mut self, name: &str, factory: Factory<T>) -> Option<Factory<T>> {
        let previous = self.factories.insert(name.to_string(), factory);
        if previous.is_some() {
            log::warn!("{} type '{}' re-registered", self.kind, name);
        } else {
            log::debug!("registered {} type '{}'", self.kind, name);
        }
        previous
    }

    /// Instantiate the type registered under `name`
    pub fn create(&self, name: &str) -> Option<T> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
