//! Map widget contract, registries, and page coordination.
//!
//! A page hosts any number of map widgets, each backed by an interchangeable
//! rendering provider. This crate defines the contract every provider
//! satisfies ([`provider::ProviderBackend`] / [`provider::MapProvider`]),
//! the per-widget runtime state and callback surface ([`map::Map`]), and the
//! page-wide coordination state ([`host::MapHost`]): the live-map registry
//! and factory, the weighted center-strategy pipeline, and the idempotent
//! feature dispatcher.
//!
//! Everything runs on a single cooperative event loop: callbacks fire
//! synchronously, in FIFO registration order, to completion before the
//! triggering call returns.

pub mod center;
pub mod feature;
pub mod host;
pub mod map;
pub mod provider;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;

pub use center::CenterStrategyRegistry;
pub use feature::FeatureSources;
pub use host::MapHost;
pub use map::{CenterUpdate, Map, PointerEvent};
pub use provider::{MapProvider, ProviderBackend, ProviderRegistry};
pub use surface::{Control, ControlPosition, Surface, Wrapper};
