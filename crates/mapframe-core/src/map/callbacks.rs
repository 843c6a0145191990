//! Callback types and the per-instance queues that hold them.
//!
//! Registration is additive only: no queue supports removal or
//! cancellation. Event callbacks are retained and re-fire on every
//! occurrence; lifecycle callbacks are one-shot and drained when their phase
//! completes.

use std::collections::VecDeque;

use mapframe_types::geo::LatLng;
use mapframe_types::marker::Marker;

use super::Map;

/// Callback invoked with a click, double-click, or context-click location.
pub type ClickCallback = Box<dyn FnMut(&Map, &LatLng)>;

/// Callback invoked after the view has been recentered.
pub type CenterUpdatedCallback = Box<dyn FnMut(&Map, &CenterUpdate)>;

/// Callback invoked when a marker enters, or is about to leave, the model.
pub type MarkerCallback = Box<dyn FnMut(&Map, &Marker)>;

/// One-shot lifecycle callback.
pub type LifecycleCallback = Box<dyn FnOnce(&Map)>;

/// Payload handed to center-updated callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct CenterUpdate {
    pub position: LatLng,
    /// Accuracy radius in meters, when the reposition came from a located
    /// point rather than a plain pan.
    pub accuracy: Option<f64>,
    /// Identifier of the operation that moved the view (a strategy id, a
    /// fit origin), when the caller supplied one.
    pub origin: Option<String>,
}

impl CenterUpdate {
    pub fn at(position: LatLng) -> Self {
        Self {
            position,
            accuracy: None,
            origin: None,
        }
    }
}

/// Per-event FIFO callback queues for one map instance.
#[derive(Default)]
pub(crate) struct Hooks {
    pub click: Vec<ClickCallback>,
    pub double_click: Vec<ClickCallback>,
    pub context_click: Vec<ClickCallback>,
    pub center_updated: Vec<CenterUpdatedCallback>,
    pub marker_added: Vec<MarkerCallback>,
    pub marker_removed: Vec<MarkerCallback>,
    pub initialized: VecDeque<LifecycleCallback>,
    pub populated: VecDeque<LifecycleCallback>,
}
