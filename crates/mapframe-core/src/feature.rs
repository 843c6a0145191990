//! Cross-cutting feature application.
//!
//! A feature is an independently developed behavior (marker popups,
//! clustering, view-driven re-querying) applied to every map whose page
//! settings opt in. Application is deferred until the map is fully
//! populated and guarded by the instance's permanent execution log, so a
//! feature runs at most once per map no matter how often the page
//! re-dispatches it.

use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::host::MapHost;
use crate::map::Map;

/// Per-map settings objects keyed by map id, in page-author order. Each
/// value is the map's whole settings object; a feature looks for its own
/// id inside it.
pub type FeatureSources = IndexMap<String, Value>;

/// The feature settings for `feature_id` within one map's settings object,
/// when present and enabled.
fn enabled_entry<'a>(source: &'a Value, feature_id: &str) -> Option<&'a Value> {
    let entry = source.get(feature_id)?;
    match entry.get("enable") {
        Some(Value::Bool(true)) => Some(entry),
        _ => None,
    }
}

impl MapHost {
    /// Apply a named feature to every map carrying that feature's settings.
    ///
    /// For each map id in `sources` whose entry contains `feature_id`
    /// marked enabled: resolve the instance (absent maps are skipped), skip
    /// it entirely when the execution log already records the feature, and
    /// otherwise register a populated callback -- joining immediately when
    /// the map is already populated -- that invokes `apply`. A `true`
    /// return marks the log, making the application permanent; a `false`
    /// return leaves the feature eligible for a later dispatch.
    ///
    /// Independent features dispatched against the same instance do not
    /// interfere; each has its own log entry.
    pub fn apply_feature_to_all_maps<F>(&self, feature_id: &str, apply: F, sources: &FeatureSources)
    where
        F: Fn(&Map, &Value) -> bool + 'static,
    {
        let apply = Rc::new(apply);

        for (map_id, source) in sources {
            let Some(feature_settings) = enabled_entry(source, feature_id) else {
                continue;
            };
            let Some(map) = self.map_by_id(map_id) else {
                tracing::debug!(map_id = %map_id, feature = %feature_id, "map not live, skipping");
                continue;
            };
            if map.feature_applied(feature_id) {
                continue;
            }

            let apply = Rc::clone(&apply);
            let feature_id = feature_id.to_string();
            let feature_settings = feature_settings.clone();
            map.add_populated_callback(move |map| {
                // The log may have been written between dispatch and
                // population; re-check before running.
                if map.feature_applied(&feature_id) {
                    return;
                }
                if apply(map, &feature_settings) {
                    map.mark_feature_applied(&feature_id);
                }
            });
        }
    }
}
