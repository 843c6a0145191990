//! Non-interactive static-image provider.
//!
//! Renders a fixed image per view; no controls, no per-marker visuals
//! beyond a pin count. Exists to prove the contract holds across
//! independent implementations, and for print/preview surfaces.

use std::any::Any;

use serde::Deserialize;

use mapframe_core::provider::{MapProvider, ProviderBackend};
use mapframe_core::surface::Surface;
use mapframe_types::error::ConstructionError;
use mapframe_types::geo::{Boundaries, LatLng};
use mapframe_types::marker::Marker;
use mapframe_types::settings::MapSettings;

/// Type tag this provider registers under.
pub const PROVIDER_TAG: &str = "static";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticSettings {
    pub zoom: f64,
    pub image_url: Option<String>,
}

impl Default for StaticSettings {
    fn default() -> Self {
        Self {
            zoom: 8.0,
            image_url: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct StaticProvider;

impl StaticProvider {
    pub fn new() -> Self {
        Self
    }
}

impl MapProvider for StaticProvider {
    fn build(
        &self,
        settings: &MapSettings,
        _surface: &Surface,
    ) -> Result<Box<dyn ProviderBackend>, ConstructionError> {
        let parsed = match settings.settings.get(PROVIDER_TAG) {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|err| {
                tracing::warn!(%err, "malformed static settings, using defaults");
                StaticSettings::default()
            }),
            None => StaticSettings::default(),
        };
        let zoom = parsed.zoom;
        Ok(Box::new(StaticBackend {
            settings: parsed,
            center: LatLng::new(settings.lat, settings.lng),
            zoom,
            view: None,
            pins: 0,
        }))
    }
}

pub struct StaticBackend {
    settings: StaticSettings,
    center: LatLng,
    zoom: f64,
    view: Option<Boundaries>,
    pins: usize,
}

impl StaticBackend {
    pub fn pins(&self) -> usize {
        self.pins
    }

    pub fn image_url(&self) -> Option<&str> {
        self.settings.image_url.as_deref()
    }
}

impl ProviderBackend for StaticBackend {
    fn kind(&self) -> &str {
        PROVIDER_TAG
    }

    fn default_zoom(&self) -> f64 {
        self.settings.zoom
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn recenter(&mut self, target: LatLng, _accuracy: Option<f64>) {
        self.center = target;
    }

    fn apply_boundaries(&mut self, bounds: &Boundaries) -> bool {
        if self.view.as_ref() == Some(bounds) {
            return false;
        }
        self.view = Some(*bounds);
        self.center = bounds.center();
        true
    }

    fn render_marker(&mut self, _marker: &Marker) {
        self.pins += 1;
    }

    fn clear_marker(&mut self, _marker: &Marker) {
        self.pins = self.pins.saturating_sub(1);
    }

    // Controls stay the documented stubs: a static image has none.

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
