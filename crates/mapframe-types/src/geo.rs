//! Geographic primitives: coordinate pairs and bounding boxes.
//!
//! These are plain value types. Projection math, tiling, and anything else
//! renderer-specific stays inside the provider implementations.

use serde::{Deserialize, Serialize};

/// A geographic coordinate pair, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

/// An axis-aligned geographic bounding box.
///
/// Providers compare these structurally when deciding whether a fit request
/// matches the current view, so equality is exact, not epsilon-based.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundaries {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Boundaries {
    /// Smallest box containing both corners, regardless of their order.
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            north: a.lat.max(b.lat),
            south: a.lat.min(b.lat),
            east: a.lng.max(b.lng),
            west: a.lng.min(b.lng),
        }
    }

    /// A degenerate box holding a single point.
    pub fn around(point: LatLng) -> Self {
        Self::from_corners(point, point)
    }

    /// Grow the box to contain `point`.
    pub fn extend(&mut self, point: LatLng) {
        self.north = self.north.max(point.lat);
        self.south = self.south.min(point.lat);
        self.east = self.east.max(point.lng);
        self.west = self.west.min(point.lng);
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat <= self.north
            && point.lat >= self.south
            && point.lng <= self.east
            && point.lng >= self.west
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    /// Latitudinal and longitudinal extent, in degrees.
    pub fn span(&self) -> (f64, f64) {
        (self.north - self.south, self.east - self.west)
    }
}
