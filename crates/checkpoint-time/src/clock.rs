//! Clock sources
//!
//! The checkpoint asks for the current wall-clock time on demand. A missing
//! or failed clock is reported as `CheckpointError::ClockUnavailable`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use checkpoint_core::{CheckpointError, CheckpointResult, Timestamp};
use parking_lot::Mutex;

/// Source of calendar time. Shared between the checkpoint and the lanes
/// that stamp scans, so it must be usable from several threads.
pub trait ClockSource: Send + Sync {
    fn now(&self) -> CheckpointResult<Timestamp>;
}

impl<C: ClockSource + ?Sized> ClockSource for Box<C> {
    fn now(&self) -> CheckpointResult<Timestamp> {
        (**self).now()
    }
}

impl<C: ClockSource + ?Sized> ClockSource for Arc<C> {
    fn now(&self) -> CheckpointResult<Timestamp> {
        (**self).now()
    }
}

/// Local wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> CheckpointResult<Timestamp> {
        Ok(Timestamp::from_naive(chrono::Local::now().naive_local()))
    }
}

/// Clock that never answers - models a missing real-time clock
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableClock;

impl ClockSource for UnavailableClock {
    fn now(&self) -> CheckpointResult<Timestamp> {
        Err(CheckpointError::ClockUnavailable("no clock device".into()))
    }
}

/// Degraded fallback: a fixed anchor advanced by the monotonic OS clock.
/// Durations stay correct, calendar values are meaningless.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    anchor: Timestamp,
    reference: Instant,
}

impl MonotonicClock {
    pub fn new(anchor: Timestamp) -> Self {
        MonotonicClock {
            anchor,
            reference: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new(Timestamp::default())
    }
}

impl ClockSource for MonotonicClock {
    fn now(&self) -> CheckpointResult<Timestamp> {
        Ok(self.anchor + self.reference.elapsed())
    }
}

#[derive(Debug)]
struct ManualState {
    now: Timestamp,
    available: bool,
}

/// Settable clock for tests and simulation.
/// Clones share the same underlying time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        ManualClock {
            state: Arc::new(Mutex::new(ManualState {
                now: start,
                available: true,
            })),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) -> Timestamp {
        let mut state = self.state.lock();
        state.now = state.now + by;
        state.now
    }

    pub fn advance_millis(&self, millis: u64) -> Timestamp {
        self.advance(Duration::from_millis(millis))
    }

    /// Jump to an arbitrary time (may go backwards)
    pub fn set(&self, now: Timestamp) {
        self.state.lock().now = now;
    }

    /// Simulate the clock dropping out or recovering
    pub fn set_available(&self, available: bool) {
        self.state.lock().available = available;
    }

    /// Current value regardless of availability
    pub fn peek(&self) -> Timestamp {
        self.state.lock().now
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> CheckpointResult<Timestamp> {
        let state = self.state.lock();
        if state.available {
            Ok(state.now)
        } else {
            Err(CheckpointError::ClockUnavailable("manual clock disabled".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> Timestamp {
        Timestamp::from_ymd_hms(2026, 10, 19, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(start());
        let handle = clock.clone();

        handle.advance_millis(2500);

        assert_eq!(clock.now().unwrap() - start(), Duration::from_millis(2500));
    }

    #[test]
    fn test_manual_clock_unavailable() {
        let clock = ManualClock::new(start());
        clock.set_available(false);
        assert!(matches!(clock.now(), Err(CheckpointError::ClockUnavailable(_))));

        clock.set_available(true);
        assert_eq!(clock.now().unwrap(), start());
    }

    #[test]
    fn test_unavailable_clock() {
        assert!(UnavailableClock.now().is_err());
    }

    #[test]
    fn test_monotonic_clock_advances_from_anchor() {
        let clock = MonotonicClock::new(start());
        let t1 = clock.now().unwrap();
        std::thread::sleep(Duration::from_millis(5));
        let t2 = clock.now().unwrap();

        assert!(t1 >= start());
        assert!(t2 > t1);
    }

    #[test]
    fn test_boxed_clock() {
        let clock: Box<dyn ClockSource> = Box::new(ManualClock::new(start()));
        assert_eq!(clock.now().unwrap(), start());
    }

    #[test]
    fn test_shared_clock_sees_manual_changes() {
        let manual = ManualClock::new(start());
        let shared: Arc<dyn ClockSource> = Arc::new(manual.clone());
        manual.advance_millis(2000);
        assert_eq!(shared.now().unwrap(), start() + Duration::from_millis(2000));
    }
}
