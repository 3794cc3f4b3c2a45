//! Scroll/resize listener state machine
//!
//! ```text
//! Disabled --ENABLE--> Enabled --DISABLE--> Disabled
//! ```
//!
//! Re-sending the event for the current state is not a transition, which
//! is what makes `enable()` and `disable()` idempotent.

use std::time::Instant;

use tracing::trace;

use crate::config::TrackerConfig;
use crate::rate_limit::{Debounce, Throttle};

/// Whether the tracker is listening for viewport events
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ListenerState {
    #[default]
    Disabled,
    Enabled,
}

/// Listener state machine events
pub mod listener_events {
    /// Attach the scroll and resize handlers
    pub const ENABLE: u32 = 1;
    /// Detach both handlers
    pub const DISABLE: u32 = 2;
}

impl ListenerState {
    /// Handle an event and return the new state, or None if no transition
    pub fn on_event(&self, event: u32) -> Option<Self> {
        use listener_events::*;

        match (self, event) {
            (ListenerState::Disabled, ENABLE) => Some(ListenerState::Enabled),
            (ListenerState::Enabled, DISABLE) => Some(ListenerState::Disabled),
            _ => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ListenerState::Enabled)
    }
}

/// Which handlers are due after a poll
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Due {
    pub scroll: bool,
    pub resize: bool,
}

/// Rate-limited attachment point for viewport events
#[derive(Clone, Debug)]
pub struct Listener {
    state: ListenerState,
    scroll: Throttle,
    resize: Debounce,
}

impl Listener {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            state: ListenerState::Disabled,
            scroll: Throttle::new(config.scroll_throttle()),
            resize: Debounce::new(config.resize_debounce()),
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    /// Returns true if the state changed
    pub fn enable(&mut self) -> bool {
        self.send(listener_events::ENABLE)
    }

    /// Returns true if the state changed; pending calls are dropped
    pub fn disable(&mut self) -> bool {
        let changed = self.send(listener_events::DISABLE);
        if changed {
            self.scroll.cancel();
            self.resize.cancel();
        }
        changed
    }

    fn send(&mut self, event: u32) -> bool {
        match self.state.on_event(event) {
            Some(next) => {
                trace!(from = ?self.state, to = ?next, "listener transition");
                self.state = next;
                true
            }
            None => false,
        }
    }

    /// Record a scroll notification; true when the handler should run now
    pub fn scrolled(&mut self, now: Instant) -> bool {
        self.is_enabled() && self.scroll.call(now)
    }

    /// Record a resize notification; the handler runs once it settles
    pub fn resized(&mut self, now: Instant) {
        if self.is_enabled() {
            self.resize.call(now);
        }
    }

    /// Consume whichever rate-limited calls are due at `now`
    pub fn poll(&mut self, now: Instant) -> Due {
        if !self.is_enabled() {
            return Due::default();
        }
        Due {
            scroll: self.scroll.poll(now),
            resize: self.resize.poll(now),
        }
    }

    /// Earliest instant at which a pending call becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.scroll.deadline(), self.resize.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_transitions() {
        use listener_events::*;
        assert_eq!(
            ListenerState::Disabled.on_event(ENABLE),
            Some(ListenerState::Enabled)
        );
        assert_eq!(ListenerState::Enabled.on_event(ENABLE), None);
        assert_eq!(
            ListenerState::Enabled.on_event(DISABLE),
            Some(ListenerState::Disabled)
        );
        assert_eq!(ListenerState::Disabled.on_event(DISABLE), None);
    }

    #[test]
    fn test_enable_disable_idempotent() {
        let mut listener = Listener::new(&TrackerConfig::standard());
        assert!(listener.enable());
        assert!(!listener.enable());
        assert!(listener.is_enabled());
        assert!(listener.disable());
        assert!(!listener.disable());
        assert!(!listener.is_enabled());
    }

    #[test]
    fn test_disabled_listener_ignores_events() {
        let t0 = Instant::now();
        let mut listener = Listener::new(&TrackerConfig::testing());
        assert!(!listener.scrolled(t0));
        listener.resized(t0);
        assert_eq!(listener.poll(t0), Due::default());
    }

    #[test]
    fn test_disable_cancels_pending() {
        let t0 = Instant::now();
        let mut listener = Listener::new(&TrackerConfig::standard());
        listener.enable();
        assert!(listener.scrolled(t0));
        assert!(!listener.scrolled(t0 + Duration::from_millis(10)));
        listener.resized(t0);
        assert!(listener.next_deadline().is_some());

        listener.disable();
        assert!(listener.next_deadline().is_none());
        listener.enable();
        assert_eq!(listener.poll(t0 + Duration::from_secs(5)), Due::default());
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let t0 = Instant::now();
        let mut listener = Listener::new(&TrackerConfig::standard().with_resize_debounce(100));
        listener.enable();
        listener.scrolled(t0);
        listener.scrolled(t0 + Duration::from_millis(1));
        listener.resized(t0);
        assert_eq!(listener.next_deadline(), Some(t0 + Duration::from_millis(100)));
    }
}
