//! Tile-based open-mapping provider.
//!
//! The reference implementation of the provider contract: a slippy-map
//! backend in the OpenStreetMap mold, with pan/zoom view state, marker
//! rendering gated on the record's render flag, boundary fitting with
//! view-equality idempotence, an accuracy indicator on located
//! recenterings, and host-page control handling.

use std::any::Any;

use serde::Deserialize;

use mapframe_core::provider::{MapProvider, ProviderBackend};
use mapframe_core::surface::{Control, Surface};
use mapframe_types::error::ConstructionError;
use mapframe_types::geo::{Boundaries, LatLng};
use mapframe_types::marker::Marker;
use mapframe_types::settings::MapSettings;

/// Type tag this provider registers under.
pub const PROVIDER_TAG: &str = "slippy";

const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Meters per degree of latitude, for sizing accuracy indicators.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Provider-specific settings, read from the `"slippy"` key of the map's
/// settings object. Every field is defaulted; a malformed object falls
/// back to defaults entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SlippySettings {
    pub zoom: f64,
    pub max_zoom: f64,
    pub tile_url: String,
    pub height: Option<String>,
    pub width: Option<String>,
    pub click_debounce_ms: u64,
}

impl Default for SlippySettings {
    fn default() -> Self {
        Self {
            zoom: 10.0,
            max_zoom: 19.0,
            tile_url: OSM_TILE_URL.to_string(),
            height: None,
            width: None,
            click_debounce_ms: mapframe_core::map::DEFAULT_CLICK_DEBOUNCE_MS,
        }
    }
}

impl SlippySettings {
    fn from_map_settings(settings: &MapSettings) -> Self {
        let Some(value) = settings.settings.get(PROVIDER_TAG) else {
            return Self::default();
        };
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(%err, "malformed slippy settings, using defaults");
                Self::default()
            }
        }
    }
}

/// Registered provider entry for the slippy backend.
#[derive(Debug, Default)]
pub struct SlippyProvider {
    unavailable: bool,
}

impl SlippyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose rendering library failed to load. Every build
    /// fails; the failure surfaces at construction time, not later.
    pub fn unavailable() -> Self {
        Self { unavailable: true }
    }
}

impl MapProvider for SlippyProvider {
    fn build(
        &self,
        settings: &MapSettings,
        surface: &Surface,
    ) -> Result<Box<dyn ProviderBackend>, ConstructionError> {
        if self.unavailable {
            return Err(ConstructionError::ProviderUnavailable(
                PROVIDER_TAG.to_string(),
                "tile renderer not loaded".to_string(),
            ));
        }
        let parsed = SlippySettings::from_map_settings(settings);
        Ok(Box::new(SlippyBackend::new(
            parsed,
            LatLng::new(settings.lat, settings.lng),
            surface.clone(),
        )))
    }
}

/// A marker's visual representation on the tile layer.
#[derive(Debug, Clone, PartialEq)]
struct RenderedMarker {
    position: LatLng,
    title: String,
    icon: Option<String>,
    label: Option<String>,
}

/// View and rendering state for one slippy map.
pub struct SlippyBackend {
    settings: SlippySettings,
    surface: Surface,
    center: LatLng,
    zoom: f64,
    /// Last fitted view, compared on every fit request.
    fitted: Option<Boundaries>,
    rendered: Vec<RenderedMarker>,
    controls: Vec<Control>,
    accuracy_circles: Vec<(LatLng, f64)>,
}

impl SlippyBackend {
    pub fn new(settings: SlippySettings, center: LatLng, surface: Surface) -> Self {
        let zoom = settings.zoom;
        Self {
            settings,
            surface,
            center,
            zoom,
            fitted: None,
            rendered: Vec::new(),
            controls: Vec::new(),
            accuracy_circles: Vec::new(),
        }
    }

    pub fn settings(&self) -> &SlippySettings {
        &self.settings
    }

    /// The rendering surface this backend draws into.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn rendered_titles(&self) -> Vec<&str> {
        self.rendered.iter().map(|m| m.title.as_str()).collect()
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn accuracy_circles(&self) -> &[(LatLng, f64)] {
        &self.accuracy_circles
    }

    /// Zoom that fits `bounds` into a single-surface view: each zoom step
    /// halves the visible span, with the whole world at zoom 0.
    fn zoom_for(&self, bounds: &Boundaries) -> f64 {
        let (lat_span, lng_span) = bounds.span();
        let span = lat_span.max(lng_span);
        if span <= 0.0 {
            return self.settings.max_zoom;
        }
        (360.0 / span).log2().floor().clamp(0.0, self.settings.max_zoom)
    }
}

impl ProviderBackend for SlippyBackend {
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
        self.zoom = zoom.clamp(0.0, self.settings.max_zoom);
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn recenter(&mut self, target: LatLng, accuracy: Option<f64>) {
        match accuracy {
            None => self.center = target,
            Some(radius) => {
                // Located point: show an indicator circle and fit to it.
                self.accuracy_circles.push((target, radius));
                let degrees = radius / METERS_PER_DEGREE;
                let mut bounds = Boundaries::around(target);
                bounds.extend(LatLng::new(target.lat + degrees, target.lng + degrees));
                bounds.extend(LatLng::new(target.lat - degrees, target.lng - degrees));
                self.apply_boundaries(&bounds);
            }
        }
    }

    fn apply_boundaries(&mut self, bounds: &Boundaries) -> bool {
        if self.fitted.as_ref() == Some(bounds) {
            return false;
        }
        self.fitted = Some(*bounds);
        self.center = bounds.center();
        self.zoom = self.zoom_for(bounds);
        true
    }

    fn render_marker(&mut self, marker: &Marker) {
        self.rendered.push(RenderedMarker {
            position: marker.position,
            title: marker.title.clone(),
            icon: marker.icon.clone(),
            label: marker.label.clone(),
        });
    }

    fn clear_marker(&mut self, marker: &Marker) {
        let target = RenderedMarker {
            position: marker.position,
            title: marker.title.clone(),
            icon: marker.icon.clone(),
            label: marker.label.clone(),
        };
        if let Some(index) = self.rendered.iter().position(|m| m == &target) {
            self.rendered.remove(index);
        }
    }

    fn add_control(&mut self, control: &Control) {
        self.controls.push(control.clone());
    }

    fn remove_controls(&mut self) {
        self.controls.clear();
    }

    fn click_debounce_ms(&self) -> u64 {
        self.settings.click_debounce_ms
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
