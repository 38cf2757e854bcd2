//! Error types for the checkpoint
//!
//! Misuse patterns detected at the lanes (unknown card, double entry,
//! invalid exit) are outcomes, not errors. Errors here come from
//! configuration, the clock, and registry misuse.

use thiserror::Error;

use crate::SlotIndex;

/// Core checkpoint errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckpointError {
    // Clock errors
    #[error("Clock unavailable: {0}")]
    ClockUnavailable(String),

    // Directory errors
    #[error("Invalid credential id: {0:?}")]
    InvalidCredentialId(String),

    #[error("Duplicate credential {id}: slots {first} and {second} collide")]
    DuplicateCredential {
        id: String,
        first: SlotIndex,
        second: SlotIndex,
    },

    #[error("Credential directory is empty")]
    EmptyDirectory,

    // Registry errors
    #[error("Unknown slot: {0}")]
    UnknownSlot(SlotIndex),

    #[error("Slot {0} is already inside")]
    AlreadyInside(SlotIndex),

    #[error("Slot {0} is not inside")]
    NotInside(SlotIndex),

    // Lane errors
    #[error("Unknown lane: {0:?}")]
    UnknownLane(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Service errors
    #[error("Scan queue closed")]
    QueueClosed,
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;
