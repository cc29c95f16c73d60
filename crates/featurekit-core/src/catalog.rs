//! Module catalog for resolving module names to factories.
//!
//! Declaration files refer to modules by name; the catalog maps those names
//! to the factories that build them.

use std::collections::HashMap;
use std::sync::Arc;

use crate::module::ModuleFactory;

/// Registry of module factories, indexed by name.
#[derive(Debug)]
pub struct ModuleCatalog {
    factories: HashMap<String, Arc<dyn ModuleFactory>>,
}

impl ModuleCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under its own module id.
    ///
    /// If a factory with this name already exists, it is replaced.
    pub fn register(&mut self, factory: Arc<dyn ModuleFactory>) {
        let name = factory.module_id().to_string();
        self.register_as(name, factory);
    }

    /// Register a factory under a name other than its module id.
    pub fn register_as(&mut self, name: impl Into<String>, factory: Arc<dyn ModuleFactory>) {
        self.factories.insert(name.into(), factory);
    }

    /// Look up a factory by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ModuleFactory>> {
        self.factories.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// List all registered module names, sorted.
    pub fn list_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::new()
    }
}
