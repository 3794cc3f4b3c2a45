//! Throttle and debounce gates
//!
//! Neither gate owns a timer. Callers pass the current [`Instant`] in and
//! poll again once [`deadline`](Throttle::deadline) has passed, which keeps
//! everything on the host's event queue.

use std::time::{Duration, Instant};

/// Runs at most once per interval, leading edge first, trailing call kept
///
/// The first call runs immediately. Calls that land inside the interval are
/// coalesced into one pending trailing run, due one interval after the last
/// run. A zero interval lets every call through.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
    pending: bool,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            pending: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a call; returns true when it should run now
    pub fn call(&mut self, now: Instant) -> bool {
        match self.last_run {
            Some(last) if now.saturating_duration_since(last) < self.interval => {
                self.pending = true;
                false
            }
            _ => {
                self.last_run = Some(now);
                self.pending = false;
                true
            }
        }
    }

    /// Returns true when the pending trailing call is due and consumes it
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.last_run = Some(now);
                self.pending = false;
                true
            }
            _ => false,
        }
    }

    /// When the pending trailing call becomes due
    pub fn deadline(&self) -> Option<Instant> {
        if !self.pending {
            return None;
        }
        self.last_run.map(|last| last + self.interval)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Drop any pending call and forget the last run
    pub fn cancel(&mut self) {
        self.last_run = None;
        self.pending = false;
    }
}

/// Runs once after calls stop arriving for the wait period
#[derive(Clone, Debug)]
pub struct Debounce {
    wait: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Record a call, pushing the deadline out
    pub fn call(&mut self, now: Instant) {
        self.deadline = Some(now + self.wait);
    }

    /// Returns true once the burst has settled and consumes the call
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
