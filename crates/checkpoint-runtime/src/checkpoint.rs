//! Checkpoint - the runtime entity and its polling loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use checkpoint_core::{
    format_dwell, CheckpointResult, CredentialId, Lane, Outcome, ScanEvent, Timestamp,
};
use checkpoint_state::{EventLog, LogEntry, PresenceEngine};
use checkpoint_time::{ClockSource, DebounceGate, MonotonicClock};
use tracing::{debug, error, info, warn};

use crate::{
    CheckpointConfig, Diagnostics, FeedbackDevice, FeedbackDirective, FeedbackDispatcher,
    LanePoller, Lanes, LightPattern, Presenter, Tone,
};

/// Where the checkpoint is in its scan/present cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Ready screen with live clock
    Idle,
    /// A scan is being classified
    Scanning,
    /// Result on screen since the given time
    Presenting { since: Timestamp },
}

#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    pub ticks: u64,
    pub scans_accepted: u64,
    /// Scans submitted while the debounce gate was closed
    pub scans_dropped: u64,
    pub unknown: u64,
    pub entries: u64,
    pub exits: u64,
    pub double_entries: u64,
    pub invalid_exits: u64,
    pub clock_faults: u64,
}

/// Peripherals the checkpoint writes to, plus its clock
pub struct Peripherals {
    pub clock: Box<dyn ClockSource>,
    pub presenter: Box<dyn Presenter>,
    pub feedback: Box<dyn FeedbackDevice>,
    pub diagnostics: Box<dyn Diagnostics>,
}

/// Someone currently inside
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occupant {
    pub name: String,
    pub entered_at: Timestamp,
}

/// Checkpoint - owns presence state, the debounce gate, the event log
/// and the output peripherals. One scan is handled to completion,
/// feedback included, before the next is looked at.
pub struct Checkpoint {
    config: CheckpointConfig,
    engine: PresenceEngine,
    gate: DebounceGate,
    log: EventLog,
    dispatcher: FeedbackDispatcher,
    io: Peripherals,
    state: LoopState,
    /// Running on the monotonic fallback clock
    degraded: bool,
    /// Inside a streak of failed clock reads
    clock_fault: bool,
    /// Minute currently shown on the ready screen
    ready_minute: Option<u32>,
    stats: RuntimeStats,
}

impl Checkpoint {
    /// Build a checkpoint from a validated configuration
    pub fn new(config: CheckpointConfig, io: Peripherals) -> CheckpointResult<Self> {
        config.validate()?;
        let directory = config.directory()?;

        Ok(Checkpoint {
            engine: PresenceEngine::new(directory),
            gate: DebounceGate::new(config.debounce()),
            log: EventLog::new(config.log_capacity),
            dispatcher: FeedbackDispatcher::default(),
            io,
            state: LoopState::Idle,
            degraded: false,
            clock_fault: false,
            ready_minute: None,
            stats: RuntimeStats::default(),
            config,
        })
    }

    pub fn with_dispatcher(mut self, dispatcher: FeedbackDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn engine(&self) -> &PresenceEngine {
        &self.engine
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    pub fn config(&self) -> &CheckpointConfig {
        &self.config
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Startup sequence: probe the clock, announce, show the ready screen.
    ///
    /// A missing clock is logged and signalled, then the checkpoint keeps
    /// running on a monotonic fallback so debouncing and dwell times
    /// still work.
    pub fn start(&mut self) {
        let now = match self.io.clock.now() {
            Ok(now) => {
                self.play(Tone::Startup, LightPattern::Off);
                now
            }
            Err(e) => {
                error!(error = %e, "clock unavailable at startup, running degraded");
                self.degraded = true;
                self.io.clock = Box::new(MonotonicClock::default());
                let now = Timestamp::default();
                self.log.append("Clock unavailable", now);
                self.io.diagnostics.record(&format!("Clock unavailable: {e}"));
                let directive = self.dispatcher.clock_failure();
                self.present(&directive);
                now
            }
        };

        info!(
            credentials = self.engine.directory().len(),
            debounce = %humantime::format_duration(self.config.debounce()),
            presentation = %humantime::format_duration(self.config.presentation_window()),
            degraded = self.degraded,
            "checkpoint started"
        );
        self.io.diagnostics.record(&format!(
            "[{}] Checkpoint ready: {} credentials, debounce {}",
            now,
            self.engine.directory().len(),
            humantime::format_duration(self.config.debounce()),
        ));

        self.state = LoopState::Idle;
        self.ready_minute = None;
        self.show_ready(now);
    }

    /// One loop iteration: poll entry, then exit, then refresh the display.
    /// At most one scan is accepted per iteration.
    pub fn tick(&mut self, lanes: &mut Lanes) -> Option<Outcome> {
        self.stats.ticks += 1;
        let mut now = self.read_clock()?;

        let mut outcome = self.poll_lane(Lane::Entry, lanes.entry.as_mut(), now);
        if outcome.is_none() {
            let delay = self.config.inter_poll_delay();
            if !delay.is_zero() {
                thread::sleep(delay);
                now = self.read_clock()?;
            }
            outcome = self.poll_lane(Lane::Exit, lanes.exit.as_mut(), now);
        }

        self.refresh_at(now);
        outcome
    }

    /// Poll until `shutdown` is set
    pub fn run(&mut self, lanes: &mut Lanes, shutdown: &AtomicBool) {
        self.start();
        while !shutdown.load(Ordering::Relaxed) {
            self.tick(lanes);
            thread::sleep(self.config.poll_interval());
        }
        info!(ticks = self.stats.ticks, "checkpoint loop stopped");
    }

    /// Handle a credential pushed by a lane, stamped with the current time
    pub fn scan(&mut self, lane: Lane, credential_id: CredentialId) -> Option<Outcome> {
        let now = self.read_clock()?;
        self.submit(ScanEvent::new(lane, credential_id, now))
    }

    /// Handle a pre-stamped scan. Dropped without classification or logging
    /// if the debounce gate is closed.
    pub fn submit(&mut self, event: ScanEvent) -> Option<Outcome> {
        if !self.gate.try_accept(event.observed_at) {
            self.stats.scans_dropped += 1;
            debug!(lane = %event.lane, "scan dropped by debounce gate");
            return None;
        }
        self.handle(event)
    }

    /// Presentation timeout and ready-screen clock, using the current time
    pub fn refresh(&mut self) {
        if let Some(now) = self.read_clock() {
            self.refresh_at(now);
        }
    }

    /// Everyone currently inside, in slot order
    pub fn occupancy(&self) -> Vec<Occupant> {
        let directory = self.engine.directory();
        self.engine
            .registry()
            .inside()
            .map(|(slot, entered_at)| Occupant {
                name: directory.name(slot).unwrap_or("?").to_string(),
                entered_at,
            })
            .collect()
    }

    /// Write the retained log to diagnostics, oldest first
    pub fn dump_log(&mut self) -> Vec<LogEntry> {
        let entries = self.log.snapshot();
        self.io.diagnostics.record(&format!(
            "Event log: {} retained, {} total",
            entries.len(),
            self.log.total_count()
        ));
        for entry in &entries {
            self.io
                .diagnostics
                .record(&format!("[{}] {}", entry.timestamp, entry.message));
        }
        entries
    }

    fn poll_lane(&mut self, lane: Lane, poller: &mut dyn LanePoller, now: Timestamp) -> Option<Outcome> {
        // A closed gate leaves the card unread until it reopens
        if !self.gate.is_open(now) {
            return None;
        }
        let credential_id = poller.poll()?;
        self.submit(ScanEvent::new(lane, credential_id, now))
    }

    fn handle(&mut self, event: ScanEvent) -> Option<Outcome> {
        self.stats.scans_accepted += 1;
        self.state = LoopState::Scanning;
        self.ready_minute = None;
        let now = event.observed_at;

        let outcome = match self.engine.process(&event) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, lane = %event.lane, "classification failed");
                self.io.diagnostics.record(&format!(
                    "[{}] {} {} -> error: {e}",
                    now, event.lane, event.credential_id
                ));
                self.state = LoopState::Presenting { since: now };
                return None;
            }
        };

        self.count(&outcome);
        if let Some(message) = self.log_message(&outcome) {
            self.log.append(message, now);
        }

        let line = self.describe(&event, &outcome);
        info!(lane = %event.lane, id = %event.credential_id, outcome = outcome.kind(), "scan processed");
        self.io.diagnostics.record(&line);

        let directive = self
            .dispatcher
            .directive(&outcome, self.engine.directory(), now);
        self.present(&directive);

        self.state = LoopState::Presenting { since: now };
        Some(outcome)
    }

    fn refresh_at(&mut self, now: Timestamp) {
        let state = self.state;
        match state {
            // A clock stepped back behind the result also ends it
            LoopState::Presenting { since }
                if now < since || now - since >= self.config.presentation_window() =>
            {
                self.state = LoopState::Idle;
                self.show_ready(now);
            }
            LoopState::Idle if self.ready_minute != Some(now.minute_of_day()) => {
                self.show_ready(now);
            }
            _ => {}
        }
    }

    fn show_ready(&mut self, now: Timestamp) {
        self.ready_minute = Some(now.minute_of_day());
        let screen = self.dispatcher.ready(now);
        self.io.presenter.show(&screen);
    }

    fn read_clock(&mut self) -> Option<Timestamp> {
        match self.io.clock.now() {
            Ok(now) => {
                if self.clock_fault {
                    info!("clock recovered");
                    self.clock_fault = false;
                }
                Some(now)
            }
            Err(e) => {
                if !self.clock_fault {
                    warn!(error = %e, "clock read failed, skipping scans until it recovers");
                    self.clock_fault = true;
                    self.stats.clock_faults += 1;
                    self.io.diagnostics.record(&format!("Clock read failed: {e}"));
                    self.io.feedback.play(Tone::Warning.into());
                }
                None
            }
        }
    }

    fn present(&mut self, directive: &FeedbackDirective) {
        self.io.presenter.show(&directive.screen);
        self.play(directive.tone, directive.light);
    }

    fn play(&mut self, tone: Tone, light: LightPattern) {
        self.io.feedback.play(tone.into());
        self.io.feedback.play(light.into());
    }

    fn count(&mut self, outcome: &Outcome) {
        let counter = match outcome {
            Outcome::UnknownCredential { .. } => &mut self.stats.unknown,
            Outcome::ValidEntry { .. } => &mut self.stats.entries,
            Outcome::ValidExit { .. } => &mut self.stats.exits,
            Outcome::DoubleEntry { .. } => &mut self.stats.double_entries,
            Outcome::InvalidExit { .. } => &mut self.stats.invalid_exits,
        };
        *counter += 1;
    }

    fn log_message(&self, outcome: &Outcome) -> Option<String> {
        let directory = self.engine.directory();
        match outcome {
            Outcome::UnknownCredential { lane, id } => {
                Some(format!("Unknown card at {lane}: {}", id.key(directory.prefix_len())))
            }
            Outcome::DoubleEntry { slot } => Some(format!(
                "Double entry: {}",
                directory.name(*slot).unwrap_or("?")
            )),
            Outcome::InvalidExit { slot } => Some(format!(
                "Invalid exit: {}",
                directory.name(*slot).unwrap_or("?")
            )),
            Outcome::ValidEntry { .. } | Outcome::ValidExit { .. } => None,
        }
    }

    fn describe(&self, event: &ScanEvent, outcome: &Outcome) -> String {
        let directory = self.engine.directory();
        let who = outcome
            .slot()
            .and_then(|slot| directory.name(slot))
            .unwrap_or("-");
        let mut line = format!(
            "[{}] {} {} -> {} {}",
            event.observed_at,
            event.lane,
            event.credential_id,
            outcome.kind(),
            who
        );
        if let Outcome::ValidExit { dwell, .. } = outcome {
            line.push_str(&format!(" (dwell {})", format_dwell(*dwell)));
        }
        line
    }
}
