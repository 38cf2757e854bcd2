//! Global debounce gate
//!
//! One gate is shared by both lanes: an accepted scan on either lane starts
//! a cooldown that blocks the other lane too.

use std::time::Duration;

use checkpoint_core::Timestamp;

/// Debounce window in the reference configuration
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(1500);

/// Minimum spacing between accepted scan events, system-wide
#[derive(Clone, Debug)]
pub struct DebounceGate {
    window: Duration,
    last_accepted: Option<Timestamp>,
}

impl DebounceGate {
    pub fn new(window: Duration) -> Self {
        DebounceGate {
            window,
            last_accepted: None,
        }
    }

    /// Would an event at `now` be accepted?
    /// Lanes are only polled while the gate is open.
    pub fn is_open(&self, now: Timestamp) -> bool {
        match self.last_accepted {
            None => true,
            // Clock stepped backwards: re-arm rather than stall until it catches up
            Some(last) if now < last => true,
            Some(last) => now - last >= self.window,
        }
    }

    /// Accept an event at `now` if the window has elapsed.
    /// Rejection leaves the gate untouched.
    pub fn try_accept(&mut self, now: Timestamp) -> bool {
        if !self.is_open(now) {
            return false;
        }
        self.last_accepted = Some(now);
        true
    }

    pub fn last_accepted(&self) -> Option<Timestamp> {
        self.last_accepted
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}
