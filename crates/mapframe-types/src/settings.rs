//! Widget construction settings.
//!
//! These arrive from the page configuration as JSON; every field is
//! defaulted and unknown keys are ignored, so a partially-filled settings
//! object is always usable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::marker::MarkerRecord;

/// One entry in a map's center-resolution configuration.
///
/// `id` names a resolver in the center-strategy registry; entries run in
/// ascending `weight` order, ties keeping their configured order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CenterStrategySetting {
    pub id: String,
    #[serde(default)]
    pub weight: i32,
    /// Strategy-specific settings, handed to the resolver untouched.
    #[serde(default)]
    pub settings: Value,
}

impl CenterStrategySetting {
    pub fn new(id: impl Into<String>, weight: i32) -> Self {
        Self {
            id: id.into(),
            weight,
            settings: Value::Null,
        }
    }
}

/// Construction settings for one map widget.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapSettings {
    /// Widget identifier; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Provider type tag; the host's default provider applies when absent.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    /// Center-resolution strategies attached to this widget.
    #[serde(default)]
    pub center: Vec<CenterStrategySetting>,
    /// Provider-specific settings object, passed through untouched.
    #[serde(default)]
    pub settings: Value,
    /// Raw marker records seeded by the host page.
    #[serde(default)]
    pub markers: Vec<MarkerRecord>,
}

impl MapSettings {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: Some(id.into()),
            lat,
            lng,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults_and_ignores_unknown_keys() {
        let settings: MapSettings = serde_json::from_str(
            r#"{"id": "m1", "lat": 52.5, "lng": 13.4, "legacy_flag": true}"#,
        )
        .unwrap();

        assert_eq!(settings.id.as_deref(), Some("m1"));
        assert!(settings.provider.is_none());
        assert!(settings.center.is_empty());
        assert!(settings.markers.is_empty());
        assert!(settings.settings.is_null());
    }

    #[test]
    fn center_entries_carry_weight_and_settings() {
        let settings: MapSettings = serde_json::from_str(
            r#"{
                "id": "m1",
                "center": [
                    {"id": "fit_bounds", "weight": 20},
                    {"id": "fixed_value", "weight": 10, "settings": {"lat": 1.0, "lng": 2.0}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(settings.center.len(), 2);
        assert_eq!(settings.center[0].id, "fit_bounds");
        assert_eq!(settings.center[1].weight, 10);
        assert_eq!(settings.center[1].settings["lat"], 1.0);
    }
}
