//! The provider contract every rendering backend satisfies.
//!
//! Two traits split the concern: [`MapProvider`] is the registered entry
//! that constructs backends and drives fresh instances to readiness;
//! [`ProviderBackend`] is the per-instance rendering state the map
//! delegates provider-specific operations to. Implementations live in
//! `mapframe-providers`.

pub mod registry;

pub use registry::ProviderRegistry;

use std::any::Any;

use mapframe_types::error::ConstructionError;
use mapframe_types::geo::{Boundaries, LatLng};
use mapframe_types::marker::Marker;
use mapframe_types::settings::MapSettings;

use crate::map::Map;
use crate::map::input::DEFAULT_CLICK_DEBOUNCE_MS;
use crate::surface::{Control, Surface};

/// Rendering backend for one live map instance.
///
/// Every provider-specific operation is a method here; the defaulted
/// methods below are the only shared fallback -- a variant either overrides
/// them or gets the documented stub, never an implicit chain.
pub trait ProviderBackend {
    /// Provider type tag this backend was built by.
    fn kind(&self) -> &str;

    /// Zoom level the view resets to on `set_center`.
    fn default_zoom(&self) -> f64;

    fn zoom(&self) -> f64;

    fn set_zoom(&mut self, zoom: f64);

    /// Current visual center.
    fn center(&self) -> LatLng;

    /// Move the view. `accuracy` carries a radius in meters when the
    /// position came from a located point.
    fn recenter(&mut self, target: LatLng, accuracy: Option<f64>);

    /// Fit the view to `bounds`. Returns false when the view already
    /// matches and nothing was done -- the idempotence seam `fit_boundaries`
    /// relies on to avoid re-firing center-updated callbacks.
    fn apply_boundaries(&mut self, bounds: &Boundaries) -> bool;

    /// Smallest boundary containing every supplied marker; `None` for an
    /// empty slice. The default folds marker positions; providers with
    /// native bounds types may override.
    fn marker_boundaries(&self, markers: &[Marker]) -> Option<Boundaries> {
        let mut positions = markers.iter().map(|marker| marker.position);
        let first = positions.next()?;
        let mut bounds = Boundaries::around(first);
        for position in positions {
            bounds.extend(position);
        }
        Some(bounds)
    }

    /// Give the marker a visual representation. Only called for markers
    /// with `should_render` set. Stub by default.
    fn render_marker(&mut self, marker: &Marker) {
        let _ = marker;
    }

    /// Drop the marker's visual representation, if any. Stub by default.
    fn clear_marker(&mut self, marker: &Marker) {
        let _ = marker;
    }

    /// Attach a host-page control element. Stub by default.
    fn add_control(&mut self, control: &Control) {
        let _ = control;
    }

    /// Remove every attached control. Stub by default.
    fn remove_controls(&mut self) {}

    /// Hold interval for the click vs. double-click race.
    fn click_debounce_ms(&self) -> u64 {
        DEFAULT_CLICK_DEBOUNCE_MS
    }

    /// Downcast support for feature add-ons that need provider-specific
    /// access.
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A registered provider: builds backends and drives fresh instances
/// through their readiness lifecycle.
pub trait MapProvider {
    /// Construct the rendering backend for a new instance.
    ///
    /// This is where an unavailable rendering library surfaces, as
    /// [`ConstructionError::ProviderUnavailable`].
    fn build(
        &self,
        settings: &MapSettings,
        surface: &Surface,
    ) -> Result<Box<dyn ProviderBackend>, ConstructionError>;

    /// Drive a freshly attached instance to readiness.
    ///
    /// The default declares both phases immediately, which is correct for
    /// synchronous backends. A provider whose library loads asynchronously
    /// keeps the handle and declares each phase once it is actually
    /// reached; late subscribers join either phase through callback replay.
    fn boot(&self, map: &Map) {
        map.mark_initialized();
        map.mark_populated();
    }
}
