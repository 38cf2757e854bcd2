//! Checkpoint Time - Clock sources and scan debouncing
//!
//! This crate implements:
//! - The clock source seam (system, manual, monotonic fallback, unavailable)
//! - The single global debounce gate shared by both lanes

pub mod clock;
pub mod debounce;

pub use clock::*;
pub use debounce::*;
