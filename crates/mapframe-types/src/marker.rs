//! Markers and the raw records they are built from.
//!
//! A `MarkerRecord` is what the DOM-sourced collaborator delivers: position,
//! title, optional icon and label, and an optional render flag. A `Marker`
//! is the entry in a map's logical model. A marker may exist in the model
//! without a visual representation -- `should_render` gates rendering only,
//! never membership.

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

/// Raw marker record as delivered by the host page.
///
/// Absence of an explicit render flag defaults to render-enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub position: LatLng,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_render")]
    pub should_render: bool,
}

fn default_render() -> bool {
    true
}

impl MarkerRecord {
    pub fn new(position: LatLng, title: impl Into<String>) -> Self {
        Self {
            position,
            title: title.into(),
            icon: None,
            label: None,
            should_render: true,
        }
    }
}

/// A marker in a map's logical model.
///
/// Structural equality is deliberate: duplicate titles and positions are
/// permitted, and removal matches the first structurally-equal entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: LatLng,
    pub title: String,
    pub should_render: bool,
    pub icon: Option<String>,
    pub label: Option<String>,
    /// Index of the originating record within its wrapper. Non-owning; the
    /// record itself stays with the host page.
    pub source: Option<usize>,
}

impl Marker {
    pub fn new(position: LatLng, title: impl Into<String>) -> Self {
        Self {
            position,
            title: title.into(),
            should_render: true,
            icon: None,
            label: None,
            source: None,
        }
    }

    /// Build a marker from a raw record, remembering where it came from.
    pub fn from_record(record: &MarkerRecord, source: usize) -> Self {
        Self {
            position: record.position,
            title: record.title.clone(),
            should_render: record.should_render,
            icon: record.icon.clone(),
            label: record.label.clone(),
            source: Some(source),
        }
    }
}

impl From<MarkerRecord> for Marker {
    fn from(record: MarkerRecord) -> Self {
        Self {
            position: record.position,
            title: record.title,
            should_render: record.should_render,
            icon: record.icon,
            label: record.label,
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_render_flag_defaults_on() {
        let record: MarkerRecord = serde_json::from_str(
            r#"{"position": {"lat": 10.0, "lng": 20.0}, "title": "Depot"}"#,
        )
        .unwrap();
        assert!(record.should_render);

        let record: MarkerRecord = serde_json::from_str(
            r#"{"position": {"lat": 10.0, "lng": 20.0}, "title": "Depot", "should_render": false}"#,
        )
        .unwrap();
        assert!(!record.should_render);
    }

    #[test]
    fn from_record_keeps_source_index() {
        let record = MarkerRecord::new(LatLng::new(1.0, 2.0), "Depot");
        let marker = Marker::from_record(&record, 3);
        assert_eq!(marker.source, Some(3));
        assert_eq!(marker.title, "Depot");
    }

    #[test]
    fn structural_equality_ignores_nothing() {
        let a = Marker::new(LatLng::new(1.0, 2.0), "Depot");
        let mut b = a.clone();
        assert_eq!(a, b);

        b.label = Some("D".to_string());
        assert_ne!(a, b);
    }
}
