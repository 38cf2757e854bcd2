//! Checkpoint simulator: manual clock, scripted lanes, recorded output

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use checkpoint_core::{CheckpointResult, CredentialId, Lane, Outcome, Timestamp};
use checkpoint_runtime::{
    Checkpoint, CheckpointConfig, CredentialConfig, Diagnostics, FeedbackDevice, FeedbackPattern,
    Lanes, LanePoller, Peripherals, Presenter, Screen,
};
use checkpoint_time::ManualClock;
use parking_lot::Mutex;

/// Lane whose cards are queued by the test. Clones share the queue.
#[derive(Clone, Debug, Default)]
pub struct ScriptedLane {
    pending: Arc<Mutex<VecDeque<CredentialId>>>,
}

impl ScriptedLane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Present a card; it is read on the next poll
    pub fn present(&self, id: impl Into<CredentialId>) {
        self.pending.lock().push_back(id.into());
    }

    /// Cards not yet read
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }
}

impl LanePoller for ScriptedLane {
    fn poll(&mut self) -> Option<CredentialId> {
        self.pending.lock().pop_front()
    }
}

#[derive(Debug, Default)]
struct Recorded {
    screens: Vec<Screen>,
    patterns: Vec<FeedbackPattern>,
    lines: Vec<String>,
}

/// Presenter, feedback device and diagnostics sink in one.
/// Clones share the recording.
#[derive(Clone, Debug, Default)]
pub struct RecordingOutput {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screens(&self) -> Vec<Screen> {
        self.inner.lock().screens.clone()
    }

    pub fn last_screen(&self) -> Option<Screen> {
        self.inner.lock().screens.last().cloned()
    }

    pub fn patterns(&self) -> Vec<FeedbackPattern> {
        self.inner.lock().patterns.clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.inner.lock().lines.clone()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.screens.clear();
        inner.patterns.clear();
        inner.lines.clear();
    }
}

impl Presenter for RecordingOutput {
    fn show(&mut self, screen: &Screen) {
        self.inner.lock().screens.push(screen.clone());
    }
}

impl FeedbackDevice for RecordingOutput {
    fn play(&mut self, pattern: FeedbackPattern) {
        self.inner.lock().patterns.push(pattern);
    }
}

impl Diagnostics for RecordingOutput {
    fn record(&mut self, line: &str) {
        self.inner.lock().lines.push(line.to_string());
    }
}

/// Reference start time for simulations: 2026-10-19 08:00:00
pub fn simulation_epoch() -> Timestamp {
    Timestamp::from_ymd_hms(2026, 10, 19, 8, 0, 0).unwrap_or_default()
}

/// Roster used by simulations
pub fn simulation_config() -> CheckpointConfig {
    CheckpointConfig {
        credentials: vec![
            CredentialConfig::new("5ADA9C80", "Alice"),
            CredentialConfig::new("A3F2B71C", "Bob"),
            CredentialConfig::new("0C41E9D2", "Carol"),
        ],
        inter_poll_delay_ms: 0,
        poll_interval_ms: 0,
        ..CheckpointConfig::default()
    }
}

/// A started checkpoint wired to simulated peripherals
pub struct CheckpointSimulator {
    pub checkpoint: Checkpoint,
    pub clock: ManualClock,
    pub entry: ScriptedLane,
    pub exit: ScriptedLane,
    pub output: RecordingOutput,
    lanes: Lanes,
}

impl CheckpointSimulator {
    pub fn new(config: CheckpointConfig) -> CheckpointResult<Self> {
        Self::starting_at(config, simulation_epoch())
    }

    pub fn starting_at(config: CheckpointConfig, start: Timestamp) -> CheckpointResult<Self> {
        let clock = ManualClock::new(start);
        let output = RecordingOutput::new();
        let io = Peripherals {
            clock: Box::new(clock.clone()),
            presenter: Box::new(output.clone()),
            feedback: Box::new(output.clone()),
            diagnostics: Box::new(output.clone()),
        };
        let mut checkpoint = Checkpoint::new(config, io)?;
        checkpoint.start();

        let entry = ScriptedLane::new();
        let exit = ScriptedLane::new();
        let lanes = Lanes::new(entry.clone(), exit.clone());

        Ok(CheckpointSimulator {
            checkpoint,
            clock,
            entry,
            exit,
            output,
            lanes,
        })
    }

    /// Default simulation roster
    pub fn standard() -> CheckpointResult<Self> {
        Self::new(simulation_config())
    }

    pub fn lane(&self, lane: Lane) -> &ScriptedLane {
        match lane {
            Lane::Entry => &self.entry,
            Lane::Exit => &self.exit,
        }
    }

    /// Present a card on a lane (read on the next tick)
    pub fn present(&self, lane: Lane, id: impl Into<CredentialId>) {
        self.lane(lane).present(id);
    }

    pub fn tick(&mut self) -> Option<Outcome> {
        self.checkpoint.tick(&mut self.lanes)
    }

    pub fn advance(&mut self, by: Duration) {
        self.clock.advance(by);
    }

    pub fn advance_millis(&mut self, millis: u64) {
        self.clock.advance_millis(millis);
    }

    pub fn now(&self) -> Timestamp {
        self.clock.peek()
    }

    /// Present a card, tick once, then let `gap` pass
    pub fn scan(&mut self, lane: Lane, id: impl Into<CredentialId>, gap: Duration) -> Option<Outcome> {
        self.present(lane, id);
        let outcome = self.tick();
        self.advance(gap);
        outcome
    }

    /// Tick repeatedly every `step` until `total` has elapsed, collecting outcomes
    pub fn run_for(&mut self, total: Duration, step: Duration) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            outcomes.extend(self.tick());
            self.advance(step);
            elapsed += step;
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkpoint_core::SlotIndex;

    #[test]
    fn test_simulator_starts_idle() {
        let sim = CheckpointSimulator::standard().unwrap();
        assert_eq!(sim.output.last_screen(), Some(Screen::new("Ready to scan", "08:00")));
    }

    #[test]
    fn test_scan_helper() {
        let mut sim = CheckpointSimulator::standard().unwrap();
        let outcome = sim.scan(Lane::Entry, "0c41e9d2", Duration::from_secs(2));
        assert_eq!(outcome, Some(Outcome::ValidEntry { slot: SlotIndex(2) }));
        assert_eq!(sim.now(), simulation_epoch() + Duration::from_secs(2));
    }

    #[test]
    fn test_run_for_reads_deferred_card() {
        let mut sim = CheckpointSimulator::standard().unwrap();
        sim.present(Lane::Entry, "5ADA9C80");
        sim.present(Lane::Exit, "5ADA9C80");

        let outcomes = sim.run_for(Duration::from_secs(3), Duration::from_millis(100));
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], Outcome::ValidEntry { .. }));
        assert!(matches!(outcomes[1], Outcome::ValidExit { dwell, .. } if dwell == Duration::from_millis(1500)));
    }
}
