//! Checkpoint Runtime - Orchestration and the main loop
//!
//! Each loop iteration:
//! 1. Read the clock
//! 2. Poll the entry lane if the debounce gate is open
//! 3. Poll the exit lane if the gate is still open
//! 4. Classify an accepted scan and update presence
//! 5. Record notable outcomes in the event log
//! 6. Dispatch screen, tone and light feedback
//! 7. Return to the ready screen once the presentation window lapses

pub mod config;
pub mod io;
pub mod feedback;
pub mod checkpoint;
pub mod service;
pub mod observability;

pub use config::*;
pub use io::*;
pub use feedback::*;
pub use checkpoint::*;
pub use service::*;
pub use observability::*;
