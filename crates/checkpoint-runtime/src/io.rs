//! Peripheral seams
//!
//! The checkpoint drives card readers, a two-line display, a buzzer and
//! status lights through these traits. Implementations live with the
//! hardware or console adapters.

use std::fmt;

use checkpoint_core::CredentialId;
use tracing::info;

/// One scan lane reader. Non-blocking: `None` when no new card is present
/// or the read glitched.
pub trait LanePoller: Send {
    fn poll(&mut self) -> Option<CredentialId>;
}

/// Two-line text display
pub trait Presenter: Send {
    fn show(&mut self, screen: &Screen);
}

/// Buzzer and status lights. `play` returns once playback is finished.
pub trait FeedbackDevice: Send {
    fn play(&mut self, pattern: FeedbackPattern);
}

/// Append-only human-readable trace
pub trait Diagnostics: Send {
    fn record(&mut self, line: &str);
}

/// Contents of the two-line display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    pub line1: String,
    pub line2: String,
}

impl Screen {
    pub fn new(line1: impl Into<String>, line2: impl Into<String>) -> Self {
        Screen {
            line1: line1.into(),
            line2: line2.into(),
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.line1, self.line2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tone {
    Startup,
    Success,
    Exit,
    Unknown,
    Error,
    Warning,
    Alarm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightPattern {
    GreenBlinkX3,
    RedBlinkX5,
    Off,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedbackPattern {
    Tone(Tone),
    Light(LightPattern),
}

impl From<Tone> for FeedbackPattern {
    fn from(tone: Tone) -> Self {
        FeedbackPattern::Tone(tone)
    }
}

impl From<LightPattern> for FeedbackPattern {
    fn from(light: LightPattern) -> Self {
        FeedbackPattern::Light(light)
    }
}

/// Lane with no reader attached
#[derive(Clone, Copy, Debug, Default)]
pub struct DisconnectedLane;

impl LanePoller for DisconnectedLane {
    fn poll(&mut self) -> Option<CredentialId> {
        None
    }
}

/// Diagnostics routed into the tracing subscriber
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&mut self, line: &str) {
        info!(target: "checkpoint::diagnostics", "{line}");
    }
}

/// Both lanes, in polling priority order
pub struct Lanes {
    pub entry: Box<dyn LanePoller>,
    pub exit: Box<dyn LanePoller>,
}

impl Lanes {
    pub fn new(entry: impl LanePoller + 'static, exit: impl LanePoller + 'static) -> Self {
        Lanes {
            entry: Box::new(entry),
            exit: Box::new(exit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_display() {
        let screen = Screen::new("Hello Alice", "08:00:00");
        assert_eq!(screen.to_string(), "Hello Alice | 08:00:00");
    }

    #[test]
    fn test_pattern_conversions() {
        assert_eq!(FeedbackPattern::from(Tone::Alarm), FeedbackPattern::Tone(Tone::Alarm));
        assert_eq!(
            FeedbackPattern::from(LightPattern::Off),
            FeedbackPattern::Light(LightPattern::Off)
        );
    }

    #[test]
    fn test_disconnected_lane_is_silent() {
        let mut lanes = Lanes::new(DisconnectedLane, DisconnectedLane);
        assert!(lanes.entry.poll().is_none());
        assert!(lanes.exit.poll().is_none());
    }
}
