//! Page-wide coordination: the live-map registry, the factory, and the
//! attach flow.
//!
//! `MapHost` is the explicitly-owned process-wide state the design calls
//! for -- not ambient globals. It owns the table of live instances, the
//! provider registry, and the center-strategy registry, and enforces the
//! one-live-instance-per-id invariant through lookup-before-insert.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use uuid::Uuid;

use mapframe_types::marker::Marker;
use mapframe_types::settings::MapSettings;

use crate::center::CenterStrategyRegistry;
use crate::map::Map;
use crate::provider::{MapProvider, ProviderRegistry};
use crate::surface::Wrapper;

/// Process-wide map coordination state.
pub struct MapHost {
    maps: HashMap<String, Map>,
    providers: ProviderRegistry,
    strategies: Rc<RefCell<CenterStrategyRegistry>>,
    default_provider: String,
}

impl MapHost {
    /// Create a host whose factory falls back to `default_provider` when a
    /// settings object names none.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            maps: HashMap::new(),
            providers: ProviderRegistry::new(),
            strategies: Rc::new(RefCell::new(CenterStrategyRegistry::new())),
            default_provider: default_provider.into(),
        }
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Register a provider implementation under a type tag.
    pub fn register_provider(&mut self, tag: impl Into<String>, provider: Rc<dyn MapProvider>) {
        self.providers.register(tag, provider);
    }

    /// Register a center-resolution strategy.
    pub fn register_center_strategy(
        &mut self,
        id: impl Into<String>,
        resolver: impl Fn(&Map, &serde_json::Value) + 'static,
    ) {
        self.strategies.borrow_mut().register(id, resolver);
    }

    /// Number of live map instances.
    pub fn map_count(&self) -> usize {
        self.maps.len()
    }

    /// Drop every live instance and registration. For tests and full page
    /// teardown.
    pub fn reset(&mut self) {
        self.maps.clear();
        self.providers = ProviderRegistry::new();
        self.strategies.borrow_mut().clear();
    }

    /// Create or update the map instance for `settings`.
    ///
    /// Reuses an existing instance by id (updating it in place) unless
    /// `force_reset` is set. Construction failures -- unresolvable provider,
    /// zero or multiple rendering surfaces, an unavailable rendering
    /// library -- are logged and reported as `None`; they never panic and
    /// never leave a registry entry behind, so sibling widgets keep
    /// initializing. Callers must check the result.
    pub fn attach(
        &mut self,
        settings: MapSettings,
        wrapper: Wrapper,
        force_reset: bool,
    ) -> Option<Map> {
        let provider_tag = settings
            .provider
            .clone()
            .unwrap_or_else(|| self.default_provider.clone());
        let id = settings
            .id
            .clone()
            .unwrap_or_else(|| format!("map-{}", Uuid::now_v7().simple()));

        if !force_reset {
            if let Some(existing) = self.maps.get(&id) {
                let existing = existing.clone();
                existing.update(&settings, wrapper);
                if !existing.validate_surface() {
                    tracing::error!(map_id = %id, "existing map surface not unique after update");
                    return None;
                }
                return Some(existing);
            }
        }

        let Some(provider) = self.providers.get(&provider_tag) else {
            tracing::error!(map_id = %id, provider = %provider_tag, "map provider not registered");
            return None;
        };
        let surface = match wrapper.resolve_surface() {
            Ok(surface) => surface,
            Err(err) => {
                tracing::error!(map_id = %id, %err, "map could not be initialized");
                return None;
            }
        };
        let backend = match provider.build(&settings, &surface) {
            Ok(backend) => backend,
            Err(err) => {
                tracing::error!(map_id = %id, %err, "map could not be initialized");
                return None;
            }
        };

        let map = Map::new(
            id.clone(),
            provider_tag,
            &settings,
            wrapper,
            surface,
            backend,
            Rc::clone(&self.strategies),
        );
        // Replaces any instance being force-reset under the same id.
        self.maps.insert(id.clone(), map.clone());

        provider.boot(&map);

        if !map.validate_surface() {
            tracing::error!(map_id = %id, "map surface lost during provider boot");
            self.maps.remove(&id);
            return None;
        }
        Some(map)
    }

    /// Look up a live instance by id.
    ///
    /// Re-validates surface ownership on every lookup: a surface detached
    /// from the page after construction makes the instance unusable, so the
    /// lookup reports it as absent.
    pub fn map_by_id(&self, id: &str) -> Option<Map> {
        let map = self.maps.get(id)?;
        if !map.validate_surface() {
            tracing::warn!(map_id = %id, "existing map surface missing or not unique");
            return None;
        }
        Some(map.clone())
    }

    /// Attach every wrapper on a page, seeding markers and centering once
    /// each map's provider is ready.
    ///
    /// Per-map settings come from `settings_by_id`, keyed by wrapper id;
    /// wrappers without an entry get defaults. On the initialized phase --
    /// joined immediately for synchronous providers -- controls are rebuilt
    /// from the wrapper, the marker model is reloaded from the settings
    /// records, and the center pipeline runs. Wrappers whose factory call
    /// failed are skipped.
    pub fn attach_page(
        &mut self,
        wrappers: Vec<Wrapper>,
        settings_by_id: &IndexMap<String, MapSettings>,
    ) -> Vec<Map> {
        let mut attached = Vec::new();

        for wrapper in wrappers {
            let mut settings = settings_by_id
                .get(wrapper.id())
                .cloned()
                .unwrap_or_default();
            settings.id = Some(wrapper.id().to_string());
            let records = settings.markers.clone();

            let Some(map) = self.attach(settings, wrapper, false) else {
                continue;
            };

            map.add_initialized_callback(move |map| {
                map.remove_controls();
                let wrapper = map.wrapper();
                for control in wrapper.controls() {
                    map.add_control(control.clone());
                }
                map.remove_all_markers();
                for (index, record) in records.iter().enumerate() {
                    map.set_marker(Marker::from_record(record, index));
                }
                map.set_center();
            });

            attached.push(map);
        }

        attached
    }
}

impl std::fmt::Debug for MapHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapHost")
            .field("maps", &self.maps.len())
            .field("default_provider", &self.default_provider)
            .finish()
    }
}
