//! Feedback dispatch: outcome -> screen, tone and light

use checkpoint_core::{format_dwell, Lane, Outcome, Timestamp};
use checkpoint_state::CredentialDirectory;

use crate::{LightPattern, Screen, Tone};

/// What the presentation layer should do for one outcome
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackDirective {
    pub screen: Screen,
    pub tone: Tone,
    pub light: LightPattern,
}

/// Maps outcomes to feedback directives
#[derive(Clone, Debug)]
pub struct FeedbackDispatcher {
    ready_title: String,
}

impl FeedbackDispatcher {
    pub fn new(ready_title: impl Into<String>) -> Self {
        FeedbackDispatcher {
            ready_title: ready_title.into(),
        }
    }

    pub fn directive(
        &self,
        outcome: &Outcome,
        directory: &CredentialDirectory,
        now: Timestamp,
    ) -> FeedbackDirective {
        let name = |slot| directory.name(slot).unwrap_or("?");

        match outcome {
            Outcome::ValidEntry { slot } => FeedbackDirective {
                screen: Screen::new(format!("Hello {}", name(*slot)), now.hh_mm_ss()),
                tone: Tone::Success,
                light: LightPattern::GreenBlinkX3,
            },
            Outcome::ValidExit { slot, dwell } => FeedbackDirective {
                screen: Screen::new(
                    format!("Bye {}", name(*slot)),
                    format!("Time: {}", format_dwell(*dwell)),
                ),
                tone: Tone::Exit,
                light: LightPattern::GreenBlinkX3,
            },
            Outcome::UnknownCredential { lane, id } => {
                let prefix = match lane {
                    Lane::Entry => "ENTER",
                    Lane::Exit => "EXIT",
                };
                FeedbackDirective {
                    screen: Screen::new(
                        format!("{prefix}: {}", id.key(directory.prefix_len())),
                        now.hh_mm_ss(),
                    ),
                    tone: Tone::Unknown,
                    light: LightPattern::RedBlinkX5,
                }
            }
            Outcome::DoubleEntry { slot } => FeedbackDirective {
                screen: Screen::new("ERROR: Already", format!("inside - {}", name(*slot))),
                tone: Tone::Alarm,
                light: LightPattern::RedBlinkX5,
            },
            Outcome::InvalidExit { slot } => FeedbackDirective {
                screen: Screen::new("ERROR: Not", format!("inside - {}", name(*slot))),
                tone: Tone::Alarm,
                light: LightPattern::RedBlinkX5,
            },
        }
    }

    /// Idle screen with the live clock
    pub fn ready(&self, now: Timestamp) -> Screen {
        Screen::new(self.ready_title.as_str(), now.hh_mm())
    }

    /// Shown when the clock cannot be read at startup
    pub fn clock_failure(&self) -> FeedbackDirective {
        FeedbackDirective {
            screen: Screen::new("ERROR: Clock", "not found"),
            tone: Tone::Error,
            light: LightPattern::RedBlinkX5,
        }
    }
}

impl Default for FeedbackDispatcher {
    fn default() -> Self {
        Self::new("Ready to scan")
    }
}
