//! Checkpoint Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every checkpoint layer:
//! - Identifiers (CredentialId, SlotIndex) and scan lanes
//! - Calendar timestamps and dwell formatting
//! - Scan events and classified outcomes
//! - The crate-wide error type

pub mod id;
pub mod time;
pub mod event;
pub mod error;

pub use id::*;
pub use time::*;
pub use event::*;
pub use error::*;
