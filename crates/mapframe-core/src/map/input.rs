//! Pointer input and the click vs. double-click race.
//!
//! Browsers deliver a click before the double-click it belongs to, so a
//! single click is held for a configurable interval and released only when
//! no double-click supersedes it. The interval is a tunable, not a
//! contract; the clock is supplied by the caller so behavior stays
//! deterministic under test.

use mapframe_types::geo::LatLng;

/// Default hold interval before a pending click is released.
pub const DEFAULT_CLICK_DEBOUNCE_MS: u64 = 500;

/// Raw pointer event delivered by the host page, stamped with the host
/// clock in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Click { at: LatLng, now_ms: u64 },
    DoubleClick { at: LatLng, now_ms: u64 },
    ContextClick { at: LatLng },
}

/// Resolves the click vs. double-click race.
#[derive(Debug)]
pub struct ClickDebouncer {
    interval_ms: u64,
    pending: Option<(LatLng, u64)>,
}

impl ClickDebouncer {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            pending: None,
        }
    }

    /// Record a click. Holds it pending; returns a previously pending click
    /// whose interval had already elapsed.
    pub fn press(&mut self, at: LatLng, now_ms: u64) -> Option<LatLng> {
        let released = self.poll(now_ms);
        self.pending = Some((at, now_ms));
        released
    }

    /// A double-click supersedes any pending single click.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// Release the pending click once its interval has elapsed.
    pub fn poll(&mut self, now_ms: u64) -> Option<LatLng> {
        match self.pending {
            Some((at, pressed_ms)) if now_ms.saturating_sub(pressed_ms) >= self.interval_ms => {
                self.pending = None;
                Some(at)
            }
            _ => None,
        }
    }
}

impl Default for ClickDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_DEBOUNCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> LatLng {
        LatLng::new(52.5, 13.4)
    }

    #[test]
    fn click_is_held_for_the_interval() {
        let mut debouncer = ClickDebouncer::new(500);
        assert_eq!(debouncer.press(at(), 1_000), None);
        assert_eq!(debouncer.poll(1_499), None);
        assert_eq!(debouncer.poll(1_500), Some(at()));
        // Released exactly once.
        assert_eq!(debouncer.poll(2_000), None);
    }

    #[test]
    fn double_click_cancels_the_pending_click() {
        let mut debouncer = ClickDebouncer::new(500);
        debouncer.press(at(), 1_000);
        debouncer.cancel_pending();
        assert_eq!(debouncer.poll(2_000), None);
    }

    #[test]
    fn press_releases_an_elapsed_predecessor() {
        let mut debouncer = ClickDebouncer::new(500);
        debouncer.press(at(), 1_000);
        let second = LatLng::new(0.0, 0.0);
        assert_eq!(debouncer.press(second, 1_600), Some(at()));
        assert_eq!(debouncer.poll(2_100), Some(second));
    }
}
