//! Test support: a recording provider implementation and host/wrapper
//! helpers shared by the map, host, center, and feature tests.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use mapframe_types::error::ConstructionError;
use mapframe_types::geo::{Boundaries, LatLng};
use mapframe_types::marker::Marker;
use mapframe_types::settings::MapSettings;

use crate::host::MapHost;
use crate::map::Map;
use crate::provider::{MapProvider, ProviderBackend};
use crate::surface::{Surface, Wrapper};

/// Shared record of the marker sets handed to boundary computation.
#[derive(Clone, Default)]
pub(crate) struct BoundaryLog(Rc<RefCell<Vec<Vec<String>>>>);

impl BoundaryLog {
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.0.borrow().clone()
    }
}

/// Backend that records everything interesting and keeps plain view state.
pub(crate) struct TestBackend {
    pub zoom: f64,
    pub center: LatLng,
    pub view: Option<Boundaries>,
    pub rendered: Vec<String>,
    pub boundary_log: BoundaryLog,
}

impl Default for TestBackend {
    fn default() -> Self {
        Self {
            zoom: 10.0,
            center: LatLng::new(0.0, 0.0),
            view: None,
            rendered: Vec::new(),
            boundary_log: BoundaryLog::default(),
        }
    }
}

impl ProviderBackend for TestBackend {
    fn kind(&self) -> &str {
        "test"
    }

    fn default_zoom(&self) -> f64 {
        10.0
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

    fn marker_boundaries(&self, markers: &[Marker]) -> Option<Boundaries> {
        self.boundary_log
            .0
            .borrow_mut()
            .push(markers.iter().map(|m| m.title.clone()).collect());

        let mut positions = markers.iter().map(|m| m.position);
        let first = positions.next()?;
        let mut bounds = Boundaries::around(first);
        for position in positions {
            bounds.extend(position);
        }
        Some(bounds)
    }

    fn render_marker(&mut self, marker: &Marker) {
        self.rendered.push(marker.title.clone());
    }

    fn clear_marker(&mut self, marker: &Marker) {
        if let Some(index) = self.rendered.iter().position(|t| t == &marker.title) {
            self.rendered.remove(index);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Synchronous provider: boots instances to populated immediately.
pub(crate) struct TestProvider;

impl TestProvider {
    pub fn new() -> Self {
        Self
    }
}

impl MapProvider for TestProvider {
    fn build(
        &self,
        _settings: &MapSettings,
        _surface: &Surface,
    ) -> Result<Box<dyn ProviderBackend>, ConstructionError> {
        Ok(Box::new(TestBackend::default()))
    }
}

/// Provider that never declares readiness; tests drive the lifecycle.
pub(crate) struct ManualBootProvider;

impl MapProvider for ManualBootProvider {
    fn build(
        &self,
        _settings: &MapSettings,
        _surface: &Surface,
    ) -> Result<Box<dyn ProviderBackend>, ConstructionError> {
        Ok(Box::new(TestBackend::default()))
    }

    fn boot(&self, _map: &Map) {}
}

pub(crate) fn wrapper(id: &str) -> Wrapper {
    Wrapper::new(id)
}

pub(crate) fn test_host() -> MapHost {
    let mut host = MapHost::new("test");
    host.register_provider("test", Rc::new(TestProvider::new()));
    host
}

pub(crate) fn manual_host() -> MapHost {
    let mut host = MapHost::new("test");
    host.register_provider("test", Rc::new(ManualBootProvider));
    host
}

/// A booted map with one surface and a test backend.
pub(crate) fn attached_map(id: &str) -> Map {
    attached_map_with(wrapper(id))
}

pub(crate) fn attached_map_with(wrapper: Wrapper) -> Map {
    let id = wrapper.id().to_string();
    let mut host = test_host();
    host.attach(MapSettings::new(id, 52.5, 13.4), wrapper, false)
        .expect("test map attaches")
}

pub(crate) fn titles(markers: &[Marker]) -> Vec<String> {
    markers.iter().map(|m| m.title.clone()).collect()
}
