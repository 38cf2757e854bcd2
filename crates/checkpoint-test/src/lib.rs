//! Checkpoint Test Harness - Simulation and scenario fuzzing
//!
//! This crate provides:
//! - Scripted lanes and recording peripherals
//! - A checkpoint simulator driven by a manual clock
//! - Seeded random scan scenarios checked against a reference model

pub mod simulator;
pub mod scenario_fuzzer;

pub use simulator::*;
pub use scenario_fuzzer::*;
