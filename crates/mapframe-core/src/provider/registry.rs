//! Provider registry for runtime provider lookup.
//!
//! A simple tag-indexed registry of map providers.

use std::collections::HashMap;
use std::rc::Rc;

use super::MapProvider;

/// Registry of available map providers, indexed by type tag.
///
/// Used by the factory to resolve the implementation responsible for a
/// settings object's provider type.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Rc<dyn MapProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider under the given type tag.
    ///
    /// If a provider with this tag already exists, it is replaced. There is
    /// no removal.
    pub fn register(&mut self, tag: impl Into<String>, provider: Rc<dyn MapProvider>) {
        self.providers.insert(tag.into(), provider);
    }

    /// Look up a provider by type tag.
    pub fn get(&self, tag: &str) -> Option<Rc<dyn MapProvider>> {
        self.providers.get(tag).cloned()
    }

    /// List all registered type tags.
    pub fn list_tags(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }
}
