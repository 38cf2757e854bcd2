//! Checkpoint State Engine - Presence tracking and event classification
//!
//! This crate implements the presence state machine:
//! - Credential directory (fixed id -> slot mapping)
//! - Presence registry (one inside/entry-time record per slot)
//! - Event classification (known/unknown, valid/misuse)
//! - Bounded event log of notable outcomes

pub mod directory;
pub mod registry;
pub mod classify;
pub mod log;

pub use directory::*;
pub use registry::*;
pub use classify::*;
pub use log::*;
