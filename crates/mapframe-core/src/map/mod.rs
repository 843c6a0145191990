//! One widget's runtime state and the base contract around it.
//!
//! [`Map`] is a cheaply-cloneable handle over a single map instance:
//! identity, authoritative position, the ordered marker model, the
//! monotonic lifecycle (uninitialized -> initialized -> populated), the
//! per-event callback queues, and the feature-execution log. The handle is
//! what providers, feature add-ons, and the host page all hold; callbacks
//! receive it so they can call back into the instance they observe.
//!
//! Callback semantics, shared by every event:
//! - synchronous, strict FIFO registration order, run to completion before
//!   the triggering call returns;
//! - additive only, no removal;
//! - lifecycle phases replay on join: a callback added after a phase has
//!   completed is invoked immediately, exactly once.

pub mod callbacks;
pub mod input;

pub use callbacks::{CenterUpdate, CenterUpdatedCallback, ClickCallback, MarkerCallback};
pub use input::{ClickDebouncer, DEFAULT_CLICK_DEBOUNCE_MS, PointerEvent};

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;

use mapframe_types::geo::{Boundaries, LatLng};
use mapframe_types::marker::Marker;
use mapframe_types::settings::{CenterStrategySetting, MapSettings};

use crate::center::{self, CenterStrategyRegistry};
use crate::provider::ProviderBackend;
use crate::surface::{Control, Surface, Wrapper};

use callbacks::Hooks;

struct MapState {
    id: String,
    provider_kind: String,
    /// Authoritative center from the construction settings; `set_center`
    /// returns the view here before the strategy pipeline runs.
    position: LatLng,
    provider_settings: Value,
    center_strategies: Vec<CenterStrategySetting>,
    wrapper: Wrapper,
    surface: Surface,
    markers: Vec<Marker>,
    initialized: bool,
    populated: bool,
    hooks: Hooks,
    /// Feature id -> applied flag. Once true, permanent for this instance.
    features: BTreeMap<String, bool>,
    backend: Box<dyn ProviderBackend>,
    strategies: Rc<RefCell<CenterStrategyRegistry>>,
    debouncer: ClickDebouncer,
}

/// Handle to one live map instance. Clones share the instance.
#[derive(Clone)]
pub struct Map {
    state: Rc<RefCell<MapState>>,
}

/// Fire one event queue: take it out of the cell, invoke FIFO, then splice
/// it back in front of anything registered during the fire. Taking the
/// queue keeps the cell un-borrowed while callbacks run, so callbacks may
/// re-enter the map freely.
macro_rules! fire {
    ($self:ident, $queue:ident, $($arg:expr),+) => {{
        let mut taken = std::mem::take(&mut $self.state.borrow_mut().hooks.$queue);
        for callback in taken.iter_mut() {
            callback($self, $($arg),+);
        }
        let mut state = $self.state.borrow_mut();
        let late = std::mem::take(&mut state.hooks.$queue);
        taken.extend(late);
        state.hooks.$queue = taken;
    }};
}

impl Map {
    pub(crate) fn new(
        id: String,
        provider_kind: String,
        settings: &MapSettings,
        wrapper: Wrapper,
        surface: Surface,
        backend: Box<dyn ProviderBackend>,
        strategies: Rc<RefCell<CenterStrategyRegistry>>,
    ) -> Self {
        let debouncer = ClickDebouncer::new(backend.click_debounce_ms());
        Self {
            state: Rc::new(RefCell::new(MapState {
                id,
                provider_kind,
                position: LatLng::new(settings.lat, settings.lng),
                provider_settings: settings.settings.clone(),
                center_strategies: settings.center.clone(),
                wrapper,
                surface,
                markers: Vec::new(),
                initialized: false,
                populated: false,
                hooks: Hooks::default(),
                features: BTreeMap::new(),
                backend,
                strategies,
                debouncer,
            })),
        }
    }

    // -----------------------------------------------------------------
    // Identity and state accessors
    // -----------------------------------------------------------------

    pub fn id(&self) -> String {
        self.state.borrow().id.clone()
    }

    pub fn provider_kind(&self) -> String {
        self.state.borrow().provider_kind.clone()
    }

    /// Authoritative center from the settings, not the current view.
    pub fn position(&self) -> LatLng {
        self.state.borrow().position
    }

    /// Current visual center, as reported by the backend.
    pub fn center(&self) -> LatLng {
        self.state.borrow().backend.center()
    }

    pub fn zoom(&self) -> f64 {
        self.state.borrow().backend.zoom()
    }

    /// Snapshot of the marker model, in insertion order.
    pub fn markers(&self) -> Vec<Marker> {
        self.state.borrow().markers.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    pub fn is_populated(&self) -> bool {
        self.state.borrow().populated
    }

    pub fn wrapper(&self) -> Wrapper {
        self.state.borrow().wrapper.clone()
    }

    /// Provider-specific settings object currently in effect.
    pub fn provider_settings(&self) -> Value {
        self.state.borrow().provider_settings.clone()
    }

    /// Whether `other` is a handle to this same instance.
    pub fn same_instance(&self, other: &Map) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Run `f` against the rendering backend. Feature add-ons use this with
    /// `ProviderBackend::as_any` for provider-specific access.
    pub fn with_backend<R>(&self, f: impl FnOnce(&dyn ProviderBackend) -> R) -> R {
        f(self.state.borrow().backend.as_ref())
    }

    pub fn with_backend_mut<R>(&self, f: impl FnOnce(&mut dyn ProviderBackend) -> R) -> R {
        f(self.state.borrow_mut().backend.as_mut())
    }

    pub(crate) fn validate_surface(&self) -> bool {
        let state = self.state.borrow();
        state.surface.is_attached() && state.wrapper.resolve_surface().is_ok()
    }

    // -----------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------

    /// Merge new configuration into the instance and re-bind the rendering
    /// surface. Never changes the id; unknown settings keys were already
    /// dropped at deserialization. No error path.
    pub fn update(&self, settings: &MapSettings, wrapper: Wrapper) {
        let mut state = self.state.borrow_mut();
        merge_settings(&mut state.provider_settings, &settings.settings);
        state.position = LatLng::new(settings.lat, settings.lng);
        if !settings.center.is_empty() {
            state.center_strategies = settings.center.clone();
        }
        state.wrapper = wrapper;
        match state.wrapper.resolve_surface() {
            Ok(surface) => state.surface = surface,
            // Keep the previously bound surface; the factory re-validates.
            Err(err) => tracing::debug!(map_id = %state.id, %err, "surface re-bind failed"),
        }
    }

    // -----------------------------------------------------------------
    // Marker model
    // -----------------------------------------------------------------

    /// Append a marker to the model and fire marker-added callbacks.
    ///
    /// Always succeeds; duplicate titles and positions are permitted.
    /// Markers with `should_render` unset join the model without a visual
    /// representation.
    pub fn set_marker(&self, marker: Marker) -> Marker {
        {
            let mut state = self.state.borrow_mut();
            if marker.should_render {
                state.backend.render_marker(&marker);
            }
            state.markers.push(marker.clone());
        }
        self.emit_marker_added(&marker);
        marker
    }

    /// Fire marker-removed callbacks, then remove the first
    /// structurally-equal entry. Removing an absent marker is a no-op and
    /// fires nothing.
    pub fn remove_marker(&self, marker: &Marker) {
        let present = self.state.borrow().markers.iter().any(|m| m == marker);
        if !present {
            return;
        }
        self.emit_marker_removed(marker);
        let mut state = self.state.borrow_mut();
        // Re-locate: a removal callback may have mutated the model.
        if let Some(index) = state.markers.iter().position(|m| m == marker) {
            state.markers.remove(index);
            state.backend.clear_marker(marker);
        }
    }

    /// Remove every marker, one at a time, against a snapshot taken before
    /// iteration begins -- callbacks triggered by removal cannot corrupt
    /// the iteration.
    pub fn remove_all_markers(&self) {
        let snapshot = self.state.borrow().markers.clone();
        for marker in &snapshot {
            self.remove_marker(marker);
        }
    }

    // -----------------------------------------------------------------
    // Centering and fitting
    // -----------------------------------------------------------------

    /// Reset zoom to the provider default, recenter on the stored position,
    /// then run the full center-strategy pipeline. A wrapper marked
    /// preserve-center makes this a no-op.
    pub fn set_center(&self) {
        if self.state.borrow().wrapper.preserves_center() {
            return;
        }
        let position = {
            let mut state = self.state.borrow_mut();
            let zoom = state.backend.default_zoom();
            state.backend.set_zoom(zoom);
            state.position
        };
        self.set_center_by_coordinates(position, None, None);

        let (registry, strategies) = {
            let state = self.state.borrow();
            (Rc::clone(&state.strategies), state.center_strategies.clone())
        };
        center::run_pipeline(&registry, self, &strategies);
    }

    /// Move the view to `coordinates` and fire center-updated callbacks.
    /// Strategy resolvers call back into this to actually move the view.
    pub fn set_center_by_coordinates(
        &self,
        coordinates: LatLng,
        accuracy: Option<f64>,
        origin: Option<&str>,
    ) {
        self.state
            .borrow_mut()
            .backend
            .recenter(coordinates, accuracy);
        let update = CenterUpdate {
            position: coordinates,
            accuracy,
            origin: origin.map(str::to_string),
        };
        self.emit_center_updated(&update);
    }

    /// Fit the view to the given markers, defaulting to the whole model.
    /// Returns false, silently, when there is nothing to fit.
    pub fn fit_to_markers(&self, markers: Option<&[Marker]>, origin: Option<&str>) -> bool {
        let Some(bounds) = self.marker_boundaries(markers) else {
            return false;
        };
        self.fit_boundaries(&bounds, origin)
    }

    /// Boundary large enough to contain the given markers, defaulting to
    /// the whole model; `None` when there are none.
    pub fn marker_boundaries(&self, markers: Option<&[Marker]>) -> Option<Boundaries> {
        let state = self.state.borrow();
        match markers {
            Some(markers) => state.backend.marker_boundaries(markers),
            None => state.backend.marker_boundaries(&state.markers),
        }
    }

    /// Fit the view to `bounds`. Idempotent: when the view already matches,
    /// nothing happens and center-updated callbacks are not re-fired.
    /// Returns whether the view changed.
    pub fn fit_boundaries(&self, bounds: &Boundaries, origin: Option<&str>) -> bool {
        let changed = self.state.borrow_mut().backend.apply_boundaries(bounds);
        if changed {
            let position = self.state.borrow().backend.center();
            let update = CenterUpdate {
                position,
                accuracy: None,
                origin: origin.map(str::to_string),
            };
            self.emit_center_updated(&update);
        }
        changed
    }

    // -----------------------------------------------------------------
    // Controls
    // -----------------------------------------------------------------

    pub fn add_control(&self, control: Control) {
        self.state.borrow_mut().backend.add_control(&control);
    }

    pub fn remove_controls(&self) {
        self.state.borrow_mut().backend.remove_controls();
    }

    // -----------------------------------------------------------------
    // Pointer input
    // -----------------------------------------------------------------

    /// Route a raw pointer event through the click debouncer to the click,
    /// double-click, and context-click queues.
    pub fn handle_pointer(&self, event: PointerEvent) {
        match event {
            PointerEvent::Click { at, now_ms } => {
                let released = self.state.borrow_mut().debouncer.press(at, now_ms);
                if let Some(at) = released {
                    self.emit_click(&at);
                }
            }
            PointerEvent::DoubleClick { at, .. } => {
                self.state.borrow_mut().debouncer.cancel_pending();
                self.emit_double_click(&at);
            }
            PointerEvent::ContextClick { at } => {
                self.emit_context_click(&at);
            }
        }
    }

    /// Release a pending click whose hold interval has elapsed. The host
    /// calls this from its idle tick.
    pub fn poll_input(&self, now_ms: u64) {
        let released = self.state.borrow_mut().debouncer.poll(now_ms);
        if let Some(at) = released {
            self.emit_click(&at);
        }
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Declare the provider ready: drain the initialized queue FIFO,
    /// invoking each callback exactly once, then set the flag. Callbacks
    /// queued during the drain are drained too. Safe to call again.
    pub fn mark_initialized(&self) {
        loop {
            let callback = {
                let mut state = self.state.borrow_mut();
                match state.hooks.initialized.pop_front() {
                    Some(callback) => callback,
                    None => {
                        state.initialized = true;
                        break;
                    }
                }
            };
            callback(self);
        }
    }

    /// Declare the map fully populated. Same drain semantics as
    /// [`Map::mark_initialized`]; never fires before the initialized phase
    /// by contract of the provider driving both.
    pub fn mark_populated(&self) {
        loop {
            let callback = {
                let mut state = self.state.borrow_mut();
                match state.hooks.populated.pop_front() {
                    Some(callback) => callback,
                    None => {
                        state.populated = true;
                        break;
                    }
                }
            };
            callback(self);
        }
    }

    /// Run `callback` once the provider is ready -- immediately when that
    /// phase has already completed.
    pub fn add_initialized_callback(&self, callback: impl FnOnce(&Map) + 'static) {
        let already = self.state.borrow().initialized;
        if already {
            callback(self);
        } else {
            self.state
                .borrow_mut()
                .hooks
                .initialized
                .push_back(Box::new(callback));
        }
    }

    /// Run `callback` once the map is fully populated -- immediately when
    /// that phase has already completed.
    pub fn add_populated_callback(&self, callback: impl FnOnce(&Map) + 'static) {
        let already = self.state.borrow().populated;
        if already {
            callback(self);
        } else {
            self.state
                .borrow_mut()
                .hooks
                .populated
                .push_back(Box::new(callback));
        }
    }

    // -----------------------------------------------------------------
    // Event registration and firing
    // -----------------------------------------------------------------

    pub fn add_click_callback(&self, callback: impl FnMut(&Map, &LatLng) + 'static) {
        self.state.borrow_mut().hooks.click.push(Box::new(callback));
    }

    pub fn add_double_click_callback(&self, callback: impl FnMut(&Map, &LatLng) + 'static) {
        self.state
            .borrow_mut()
            .hooks
            .double_click
            .push(Box::new(callback));
    }

    pub fn add_context_click_callback(&self, callback: impl FnMut(&Map, &LatLng) + 'static) {
        self.state
            .borrow_mut()
            .hooks
            .context_click
            .push(Box::new(callback));
    }

    pub fn add_center_updated_callback(&self, callback: impl FnMut(&Map, &CenterUpdate) + 'static) {
        self.state
            .borrow_mut()
            .hooks
            .center_updated
            .push(Box::new(callback));
    }

    /// Register a marker-added callback, replaying it over every marker
    /// already present before queueing it for future additions.
    pub fn add_marker_added_callback(&self, callback: impl FnMut(&Map, &Marker) + 'static) {
        self.add_marker_added_callback_with_replay(callback, true);
    }

    /// Register a marker-added callback. With `replay` unset the callback
    /// only sees future additions.
    pub fn add_marker_added_callback_with_replay(
        &self,
        mut callback: impl FnMut(&Map, &Marker) + 'static,
        replay: bool,
    ) {
        if replay {
            let existing = self.state.borrow().markers.clone();
            for marker in &existing {
                callback(self, marker);
            }
        }
        self.state
            .borrow_mut()
            .hooks
            .marker_added
            .push(Box::new(callback));
    }

    pub fn add_marker_removed_callback(&self, callback: impl FnMut(&Map, &Marker) + 'static) {
        self.state
            .borrow_mut()
            .hooks
            .marker_removed
            .push(Box::new(callback));
    }

    /// Fire click callbacks. Providers call this for events their library
    /// delivers directly instead of through [`Map::handle_pointer`].
    pub fn emit_click(&self, at: &LatLng) {
        fire!(self, click, at);
    }

    pub fn emit_double_click(&self, at: &LatLng) {
        fire!(self, double_click, at);
    }

    pub fn emit_context_click(&self, at: &LatLng) {
        fire!(self, context_click, at);
    }

    pub fn emit_center_updated(&self, update: &CenterUpdate) {
        fire!(self, center_updated, update);
    }

    fn emit_marker_added(&self, marker: &Marker) {
        fire!(self, marker_added, marker);
    }

    fn emit_marker_removed(&self, marker: &Marker) {
        fire!(self, marker_removed, marker);
    }

    // -----------------------------------------------------------------
    // Feature execution log
    // -----------------------------------------------------------------

    /// Whether the named feature has already been applied to this instance.
    pub fn feature_applied(&self, feature_id: &str) -> bool {
        self.state
            .borrow()
            .features
            .get(feature_id)
            .copied()
            .unwrap_or(false)
    }

    /// Permanently record the named feature as applied.
    pub fn mark_feature_applied(&self, feature_id: &str) {
        self.state
            .borrow_mut()
            .features
            .insert(feature_id.to_string(), true);
    }
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Map")
            .field("id", &state.id)
            .field("provider", &state.provider_kind)
            .field("markers", &state.markers.len())
            .field("initialized", &state.initialized)
            .field("populated", &state.populated)
            .finish()
    }
}

/// Shallow merge of two settings objects: incoming keys win, everything
/// else is kept. Non-object incoming values replace the base wholesale,
/// except null, which leaves it untouched.
fn merge_settings(base: &mut Value, incoming: &Value) {
    match (&mut *base, incoming) {
        (Value::Object(base), Value::Object(incoming)) => {
            for (key, value) in incoming {
                base.insert(key.clone(), value.clone());
            }
        }
        (_, Value::Null) => {}
        (base, incoming) => *base = incoming.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{attached_map, titles};
    use std::cell::Cell;

    use serde_json::json;

    fn marker(lat: f64, lng: f64, title: &str) -> Marker {
        Marker::new(LatLng::new(lat, lng), title)
    }

    #[test]
    fn markers_keep_insertion_order_under_interleaving() {
        let map = attached_map("m1");
        let a = map.set_marker(marker(10.0, 20.0, "A"));
        let b = map.set_marker(marker(30.0, 40.0, "B"));
        let _c = map.set_marker(marker(50.0, 60.0, "C"));

        map.remove_marker(&b);
        let d = map.set_marker(marker(70.0, 80.0, "D"));
        map.remove_marker(&d);
        map.set_marker(marker(90.0, 10.0, "E"));

        assert_eq!(titles(&map.markers()), vec!["A", "C", "E"]);
        assert_eq!(map.markers()[0], a);
    }

    #[test]
    fn removing_an_absent_marker_is_silent() {
        let map = attached_map("m1");
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        map.add_marker_removed_callback(move |_, _| counter.set(counter.get() + 1));

        map.remove_marker(&marker(1.0, 2.0, "ghost"));
        assert_eq!(fired.get(), 0);
        assert!(map.markers().is_empty());
    }

    #[test]
    fn duplicate_markers_are_permitted_and_removed_one_at_a_time() {
        let map = attached_map("m1");
        let twin = marker(10.0, 20.0, "Twin");
        map.set_marker(twin.clone());
        map.set_marker(twin.clone());
        assert_eq!(map.markers().len(), 2);

        map.remove_marker(&twin);
        assert_eq!(map.markers().len(), 1);
    }

    #[test]
    fn remove_all_markers_is_idempotent_and_silent_the_second_time() {
        let map = attached_map("m1");
        map.set_marker(marker(10.0, 20.0, "A"));
        map.set_marker(marker(30.0, 40.0, "B"));

        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        map.add_marker_removed_callback(move |_, _| counter.set(counter.get() + 1));

        map.remove_all_markers();
        assert!(map.markers().is_empty());
        assert_eq!(fired.get(), 2);

        map.remove_all_markers();
        assert!(map.markers().is_empty());
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn hidden_markers_join_the_model_but_are_never_handed_to_the_backend() {
        let map = attached_map("m1");
        let mut hidden = marker(1.0, 2.0, "Hidden");
        hidden.should_render = false;
        map.set_marker(hidden);
        map.set_marker(marker(3.0, 4.0, "Visible"));

        assert_eq!(map.markers().len(), 2);
        map.with_backend(|backend| {
            let backend = backend
                .as_any()
                .downcast_ref::<crate::testing::TestBackend>()
                .unwrap();
            assert_eq!(backend.rendered, ["Visible"]);
        });
    }

    #[test]
    fn marker_callbacks_fire_in_registration_order() {
        let map = attached_map("m1");
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            map.add_marker_added_callback(move |_, _| order.borrow_mut().push(tag));
        }

        map.set_marker(marker(10.0, 20.0, "A"));
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn marker_added_registration_replays_existing_markers_by_default() {
        let map = attached_map("m1");
        map.set_marker(marker(10.0, 20.0, "A"));
        map.set_marker(marker(30.0, 40.0, "B"));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        map.add_marker_added_callback(move |_, m| log.borrow_mut().push(m.title.clone()));
        assert_eq!(*seen.borrow(), vec!["A", "B"]);

        let log = Rc::clone(&seen);
        map.add_marker_added_callback_with_replay(
            move |_, m| log.borrow_mut().push(format!("future:{}", m.title)),
            false,
        );
        map.set_marker(marker(50.0, 60.0, "C"));
        assert_eq!(*seen.borrow(), vec!["A", "B", "C", "future:C"]);
    }

    #[test]
    fn lifecycle_callbacks_drain_fifo_then_replay_on_join() {
        let map = attached_map("m1");
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&order);
        map.add_populated_callback(move |_| log.borrow_mut().push("early"));
        assert!(order.borrow().is_empty());

        map.mark_populated();
        assert_eq!(*order.borrow(), vec!["early"]);
        assert!(map.is_populated());

        // Replay-on-join: invoked synchronously, exactly once, without
        // re-running earlier subscribers.
        let log = Rc::clone(&order);
        map.add_populated_callback(move |_| log.borrow_mut().push("late"));
        assert_eq!(*order.borrow(), vec!["early", "late"]);

        map.mark_populated();
        assert_eq!(*order.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn callbacks_queued_during_a_lifecycle_drain_run_in_the_same_drain() {
        let map = attached_map("m1");
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&order);
        map.add_initialized_callback(move |map| {
            log.borrow_mut().push("outer");
            let log = Rc::clone(&log);
            map.add_initialized_callback(move |_| log.borrow_mut().push("nested"));
        });

        map.mark_initialized();
        assert_eq!(*order.borrow(), vec!["outer", "nested"]);
    }

    #[test]
    fn set_center_resets_zoom_recenters_and_fires_center_updated() {
        let map = attached_map("m1");
        let updates = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&updates);
        map.add_center_updated_callback(move |_, update| log.borrow_mut().push(update.clone()));

        map.set_center();

        let updates = updates.borrow();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].position, map.position());
        assert_eq!(map.center(), map.position());
    }

    #[test]
    fn preserve_center_makes_set_center_a_no_op() {
        let map = crate::testing::attached_map_with(
            crate::testing::wrapper("m1").preserve_center(true),
        );
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        map.add_center_updated_callback(move |_, _| counter.set(counter.get() + 1));

        map.set_center();
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn fit_to_markers_with_empty_model_fails_silently() {
        let map = attached_map("m1");
        assert!(!map.fit_to_markers(None, None));
    }

    #[test]
    fn fit_boundaries_is_idempotent() {
        let map = attached_map("m1");
        map.set_marker(marker(10.0, 20.0, "A"));
        map.set_marker(marker(30.0, 40.0, "B"));

        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        map.add_center_updated_callback(move |_, _| counter.set(counter.get() + 1));

        assert!(map.fit_to_markers(None, Some("initial")));
        assert_eq!(fired.get(), 1);

        // Same boundary again: view already matches, no callback re-fire.
        assert!(!map.fit_to_markers(None, Some("again")));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn pointer_click_is_debounced_against_double_click() {
        let map = attached_map("m1");
        let clicks = Rc::new(Cell::new(0));
        let doubles = Rc::new(Cell::new(0));
        let c = Rc::clone(&clicks);
        map.add_click_callback(move |_, _| c.set(c.get() + 1));
        let d = Rc::clone(&doubles);
        map.add_double_click_callback(move |_, _| d.set(d.get() + 1));

        let at = LatLng::new(52.5, 13.4);
        map.handle_pointer(PointerEvent::Click { at, now_ms: 1_000 });
        map.handle_pointer(PointerEvent::DoubleClick { at, now_ms: 1_100 });
        map.poll_input(2_000);
        assert_eq!(clicks.get(), 0);
        assert_eq!(doubles.get(), 1);

        map.handle_pointer(PointerEvent::Click { at, now_ms: 3_000 });
        map.poll_input(3_499);
        assert_eq!(clicks.get(), 0);
        map.poll_input(3_500);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn update_merges_settings_and_keeps_position_fresh() {
        let map = attached_map("m1");
        let id = map.id();

        let mut incoming = MapSettings::new("ignored", 48.1, 11.5);
        incoming.settings = json!({"tiles": "muted", "zoom": 7});
        map.update(&incoming, crate::testing::wrapper("m1"));

        assert_eq!(map.id(), id);
        assert_eq!(map.position(), LatLng::new(48.1, 11.5));
        assert_eq!(map.provider_settings()["tiles"], "muted");
    }

    #[test]
    fn feature_log_is_permanent() {
        let map = attached_map("m1");
        assert!(!map.feature_applied("popup"));
        map.mark_feature_applied("popup");
        assert!(map.feature_applied("popup"));
        assert!(!map.feature_applied("cluster"));
    }

    #[test]
    fn merge_settings_shallow_merges_objects() {
        let mut base = json!({"a": 1, "b": {"kept": true}});
        merge_settings(&mut base, &json!({"b": {"replaced": true}, "c": 3}));
        assert_eq!(base, json!({"a": 1, "b": {"replaced": true}, "c": 3}));

        let mut base = json!({"a": 1});
        merge_settings(&mut base, &Value::Null);
        assert_eq!(base, json!({"a": 1}));
    }
}
