//! Scenario fuzzer - randomized scan streams checked against a reference model
//!
//! Checks:
//! - Debounce spacing (accepted scans at least one window apart)
//! - Outcome classification per lane and presence
//! - Registry invariant (inside iff entry time set)
//! - Event log count and retained window

use std::time::Duration;

use checkpoint_core::{CheckpointResult, Lane, Outcome, ScanEvent, SlotIndex, Timestamp};
use checkpoint_runtime::CheckpointConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{simulation_config, simulation_epoch, CheckpointSimulator};

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Number of scans to generate
    pub scan_count: usize,
    /// Probability a scan uses an unknown card (0.0 - 1.0)
    pub unknown_prob: f64,
    /// Probability a scan is on the entry lane
    pub entry_prob: f64,
    /// Upper bound on the gap between consecutive scans
    pub max_gap_ms: u64,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            scan_count: 1000,
            unknown_prob: 0.1,
            entry_prob: 0.5,
            max_gap_ms: 4000,
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            scan_count: 200,
            ..Self::default()
        }
    }

    /// Scans arriving faster than the debounce window
    pub fn burst() -> Self {
        FuzzerConfig {
            scan_count: 1000,
            max_gap_ms: 800,
            ..Self::default()
        }
    }

    /// Mostly unknown cards
    pub fn hostile() -> Self {
        FuzzerConfig {
            unknown_prob: 0.7,
            ..Self::default()
        }
    }
}

/// Fuzzing result
#[derive(Clone, Debug, Default)]
pub struct FuzzResult {
    pub scans: u64,
    pub accepted: u64,
    pub dropped: u64,
    pub unknown: u64,
    pub entries: u64,
    pub exits: u64,
    pub double_entries: u64,
    pub invalid_exits: u64,
    pub violations: Vec<String>,
}

impl FuzzResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    fn count(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::UnknownCredential { .. } => self.unknown += 1,
            Outcome::ValidEntry { .. } => self.entries += 1,
            Outcome::ValidExit { .. } => self.exits += 1,
            Outcome::DoubleEntry { .. } => self.double_entries += 1,
            Outcome::InvalidExit { .. } => self.invalid_exits += 1,
        }
    }
}

/// Reference model of the whole pipeline
#[derive(Debug)]
struct Model {
    window: Duration,
    last_accepted: Option<Timestamp>,
    entered_at: Vec<Option<Timestamp>>,
    logged: u64,
}

impl Model {
    fn accepts(&self, now: Timestamp) -> bool {
        self.last_accepted.map_or(true, |last| now - last >= self.window)
    }

    fn apply(&mut self, lane: Lane, slot: Option<usize>, event: &ScanEvent) -> Outcome {
        let Some(slot) = slot else {
            self.logged += 1;
            return Outcome::UnknownCredential {
                lane,
                id: event.credential_id.clone(),
            };
        };
        let now = event.observed_at;
        match (lane, self.entered_at[slot]) {
            (Lane::Entry, Some(_)) => {
                self.logged += 1;
                Outcome::DoubleEntry { slot: SlotIndex(slot) }
            }
            (Lane::Entry, None) => {
                self.entered_at[slot] = Some(now);
                Outcome::ValidEntry { slot: SlotIndex(slot) }
            }
            (Lane::Exit, None) => {
                self.logged += 1;
                Outcome::InvalidExit { slot: SlotIndex(slot) }
            }
            (Lane::Exit, Some(entered)) => {
                self.entered_at[slot] = None;
                Outcome::ValidExit {
                    slot: SlotIndex(slot),
                    dwell: now - entered,
                }
            }
        }
    }
}

/// Drives a simulated checkpoint with random scans
pub struct ScenarioFuzzer {
    config: FuzzerConfig,
    rng: StdRng,
    sim: CheckpointSimulator,
    ids: Vec<String>,
    model: Model,
}

impl ScenarioFuzzer {
    pub fn new(config: FuzzerConfig) -> CheckpointResult<Self> {
        Self::with_checkpoint_config(config, simulation_config())
    }

    pub fn with_checkpoint_config(
        config: FuzzerConfig,
        checkpoint_config: CheckpointConfig,
    ) -> CheckpointResult<Self> {
        let ids = checkpoint_config
            .credentials
            .iter()
            .map(|c| c.id.clone())
            .collect::<Vec<_>>();
        let model = Model {
            window: checkpoint_config.debounce(),
            last_accepted: None,
            entered_at: vec![None; ids.len()],
            logged: 0,
        };
        let sim = CheckpointSimulator::starting_at(checkpoint_config, simulation_epoch())?;

        Ok(ScenarioFuzzer {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            sim,
            ids,
            model,
        })
    }

    /// Pick a lane, a card (known ids in random case, with trailing noise)
    /// and a gap
    fn generate_scan(&mut self) -> (Lane, String, Option<usize>, u64) {
        let lane = if self.rng.gen_bool(self.config.entry_prob) {
            Lane::Entry
        } else {
            Lane::Exit
        };
        let gap = self.rng.gen_range(0..=self.config.max_gap_ms);

        if self.ids.is_empty() || self.rng.gen_bool(self.config.unknown_prob) {
            // High nibble F never appears in the simulation roster
            let id = format!("F{:07X}", self.rng.gen_range(0u32..0x0FFF_FFFF));
            return (lane, id, None, gap);
        }

        let slot = self.rng.gen_range(0..self.ids.len());
        let mut id = if self.rng.gen_bool(0.5) {
            self.ids[slot].to_lowercase()
        } else {
            self.ids[slot].clone()
        };
        if self.rng.gen_bool(0.25) {
            id.push_str("EE");
        }
        (lane, id, Some(slot), gap)
    }

    pub fn run(&mut self) -> FuzzResult {
        let mut result = FuzzResult::default();

        for step in 0..self.config.scan_count {
            let (lane, id, slot, gap) = self.generate_scan();
            self.sim.advance_millis(gap);
            let event = ScanEvent::new(lane, id.as_str(), self.sim.now());
            result.scans += 1;

            let expected = if self.model.accepts(event.observed_at) {
                self.model.last_accepted = Some(event.observed_at);
                Some(self.model.apply(lane, slot, &event))
            } else {
                None
            };

            let actual = self.sim.checkpoint.submit(event);
            match &actual {
                Some(outcome) => {
                    result.accepted += 1;
                    result.count(outcome);
                }
                None => result.dropped += 1,
            }

            if actual != expected {
                result.violations.push(format!(
                    "step {step}: {lane} {id}: expected {expected:?}, got {actual:?}"
                ));
            }
            self.check_invariants(step, &mut result);
        }

        result
    }

    fn check_invariants(&self, step: usize, result: &mut FuzzResult) {
        let registry = self.sim.checkpoint.engine().registry();
        for (slot, expected) in self.model.entered_at.iter().enumerate() {
            let Some(record) = registry.get(SlotIndex(slot)) else {
                result.violations.push(format!("step {step}: slot {slot} missing"));
                continue;
            };
            if record.is_inside() != record.entry_time().is_some() {
                result.violations.push(format!("step {step}: slot {slot} inconsistent"));
            }
            if record.entry_time() != *expected {
                result.violations.push(format!(
                    "step {step}: slot {slot} entry time {:?}, model {:?}",
                    record.entry_time(),
                    expected
                ));
            }
        }

        let log = self.sim.checkpoint.log();
        if log.total_count() != self.model.logged {
            result.violations.push(format!(
                "step {step}: log count {}, model {}",
                log.total_count(),
                self.model.logged
            ));
        }
        let retained = self.model.logged.min(log.capacity() as u64) as usize;
        if log.snapshot().len() != retained {
            result.violations.push(format!("step {step}: log retains {}, expected {retained}", log.len()));
        }
    }
}
