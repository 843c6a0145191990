//! Weighted center-strategy resolution.
//!
//! A process-wide mapping from strategy identifier to resolver. The
//! registry performs no geometry itself: resolvers are expected to call
//! back into [`Map::set_center_by_coordinates`] to actually move the view.
//! The set of available strategies is defined by the host page, not here.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use mapframe_types::settings::CenterStrategySetting;

use crate::map::Map;

/// A registered resolver: pure function of the map and the strategy's own
/// settings, with repositioning as its only side effect.
pub type CenterResolver = Rc<dyn Fn(&Map, &Value)>;

/// Registry of center-resolution strategies, indexed by identifier.
#[derive(Default)]
pub struct CenterStrategyRegistry {
    resolvers: HashMap<String, CenterResolver>,
}

impl CenterStrategyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Register a resolver under the given identifier, replacing any
    /// previous entry.
    pub fn register(&mut self, id: impl Into<String>, resolver: impl Fn(&Map, &Value) + 'static) {
        self.resolvers.insert(id.into(), Rc::new(resolver));
    }

    /// Look up a resolver by identifier.
    pub fn get(&self, id: &str) -> Option<CenterResolver> {
        self.resolvers.get(id).cloned()
    }

    pub fn list_ids(&self) -> Vec<&str> {
        self.resolvers.keys().map(|s| s.as_str()).collect()
    }

    /// Drop every registration. For tests and full page teardown.
    pub fn clear(&mut self) {
        self.resolvers.clear();
    }
}

/// Run a map's configured strategies through the registry.
///
/// Entries run in ascending weight order; the sort is stable, so ties keep
/// their configured order. Unregistered identifiers are silently skipped.
/// Each resolver is cloned out of the registry before invocation, so a
/// resolver may register further strategies without deadlocking the cell.
pub fn run_pipeline(
    registry: &RefCell<CenterStrategyRegistry>,
    map: &Map,
    strategies: &[CenterStrategySetting],
) {
    let mut ordered: Vec<CenterStrategySetting> = strategies.to_vec();
    ordered.sort_by_key(|strategy| strategy.weight);

    for strategy in &ordered {
        let resolver = registry.borrow().get(&strategy.id);
        match resolver {
            Some(resolver) => resolver(map, &strategy.settings),
            None => {
                tracing::debug!(strategy = %strategy.id, "center strategy not registered, skipping")
            }
        }
    }
}
