//! Concrete rendering providers for mapframe.
//!
//! Each provider satisfies the full contract from `mapframe-core`:
//! [`slippy`] is the reference tile-based provider, [`static_image`] a
//! minimal non-interactive one. Both register on a [`MapHost`] under their
//! type tag; feature add-ons and the host page never need to know which is
//! active.

pub mod slippy;
pub mod static_image;

pub use slippy::SlippyProvider;
pub use static_image::StaticProvider;

use std::rc::Rc;

use mapframe_core::MapHost;

/// Register every built-in provider on a host.
pub fn register_builtin(host: &mut MapHost) {
    host.register_provider(slippy::PROVIDER_TAG, Rc::new(SlippyProvider::new()));
    host.register_provider(static_image::PROVIDER_TAG, Rc::new(StaticProvider::new()));
}
