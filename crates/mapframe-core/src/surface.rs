//! Rendering surfaces and the wrappers that own them.
//!
//! A wrapper is the host-page element a widget lives in; it carries the
//! candidate rendering surfaces, the preserve-center flag, and any control
//! elements. Construction requires the wrapper to resolve to exactly one
//! surface; zero or several candidates is a construction failure.

use std::cell::Cell;
use std::rc::Rc;

use mapframe_types::error::ConstructionError;

/// Handle to one candidate rendering surface.
///
/// Clones share the same surface, so detachment is visible through every
/// clone. `MapHost::map_by_id` uses this to catch surfaces removed from the
/// page after construction.
#[derive(Clone, Default)]
pub struct Surface(Rc<SurfaceInner>);

#[derive(Default)]
struct SurfaceInner {
    detached: Cell<bool>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        !self.0.detached.get()
    }

    /// Mark the surface as removed from the page. Irreversible.
    pub fn detach(&self) {
        self.0.detached.set(true);
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Where a control element sits on the rendered map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlPosition {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A control element the host page hands to a map (zoom buttons,
/// attribution, custom toolbars). Opaque to the core; providers decide how
/// to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub id: String,
    pub position: ControlPosition,
}

impl Control {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: ControlPosition::default(),
        }
    }

    pub fn at(id: impl Into<String>, position: ControlPosition) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// The rendering-surface owner for one widget.
#[derive(Debug, Clone)]
pub struct Wrapper {
    id: String,
    surfaces: Vec<Surface>,
    preserve_center: bool,
    controls: Vec<Control>,
}

impl Wrapper {
    /// A wrapper owning a single freshly-attached surface. The common case.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_surfaces(id, 1)
    }

    /// A wrapper with an arbitrary surface count, including zero.
    pub fn with_surfaces(id: impl Into<String>, count: usize) -> Self {
        Self {
            id: id.into(),
            surfaces: (0..count).map(|_| Surface::new()).collect(),
            preserve_center: false,
            controls: Vec::new(),
        }
    }

    pub fn preserve_center(mut self, preserve: bool) -> Self {
        self.preserve_center = preserve;
        self
    }

    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn preserves_center(&self) -> bool {
        self.preserve_center
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Resolve the single rendering surface this wrapper owns.
    ///
    /// Detached surfaces are not candidates.
    pub fn resolve_surface(&self) -> Result<Surface, ConstructionError> {
        let attached: Vec<&Surface> = self.surfaces.iter().filter(|s| s.is_attached()).collect();
        match attached.len() {
            1 => Ok(attached[0].clone()),
            0 => Err(ConstructionError::SurfaceMissing),
            count => Err(ConstructionError::SurfaceNotUnique(count)),
        }
    }
}
