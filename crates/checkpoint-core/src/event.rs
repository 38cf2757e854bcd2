//! Event definitions
//!
//! A scan event is one credential presented at one lane. Classifying it
//! against the directory and the presence registry yields an outcome,
//! which drives the event log and the feedback devices.

use std::fmt;
use std::time::Duration;

use crate::{format_dwell, CredentialId, Lane, SlotIndex, Timestamp};

/// Raw scan, consumed immediately by the classification pipeline
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanEvent {
    pub lane: Lane,
    pub credential_id: CredentialId,
    pub observed_at: Timestamp,
}

impl ScanEvent {
    pub fn new(lane: Lane, credential_id: impl Into<CredentialId>, observed_at: Timestamp) -> Self {
        ScanEvent {
            lane,
            credential_id: credential_id.into(),
            observed_at,
        }
    }
}

/// Classified result of processing one scan event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Identifier not in the directory
    UnknownCredential { lane: Lane, id: CredentialId },
    /// Credential was outside and is now inside
    ValidEntry { slot: SlotIndex },
    /// Credential was inside and is now outside
    ValidExit { slot: SlotIndex, dwell: Duration },
    /// Entry scan while already inside
    DoubleEntry { slot: SlotIndex },
    /// Exit scan while not inside
    InvalidExit { slot: SlotIndex },
}

impl Outcome {
    /// Slot the outcome pertains to, if the credential was known
    pub fn slot(&self) -> Option<SlotIndex> {
        match self {
            Outcome::UnknownCredential { .. } => None,
            Outcome::ValidEntry { slot }
            | Outcome::ValidExit { slot, .. }
            | Outcome::DoubleEntry { slot }
            | Outcome::InvalidExit { slot } => Some(*slot),
        }
    }

    /// Does this outcome mutate presence state?
    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::ValidEntry { .. } | Outcome::ValidExit { .. })
    }

    /// Unknown cards and misuse patterns are recorded in the event log
    pub fn is_logged(&self) -> bool {
        !self.is_valid()
    }

    /// Short kind name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::UnknownCredential { .. } => "UnknownCredential",
            Outcome::ValidEntry { .. } => "ValidEntry",
            Outcome::ValidExit { .. } => "ValidExit",
            Outcome::DoubleEntry { .. } => "DoubleEntry",
            Outcome::InvalidExit { .. } => "InvalidExit",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::UnknownCredential { lane, id } => write!(f, "UnknownCredential({lane}, {id})"),
            Outcome::ValidEntry { slot } => write!(f, "ValidEntry(slot {slot})"),
            Outcome::ValidExit { slot, dwell } => {
                write!(f, "ValidExit(slot {slot}, dwell {})", format_dwell(*dwell))
            }
            Outcome::DoubleEntry { slot } => write!(f, "DoubleEntry(slot {slot})"),
            Outcome::InvalidExit { slot } => write!(f, "InvalidExit(slot {slot})"),
        }
    }
}
