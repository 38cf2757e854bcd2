//! Event classification pipeline
//!
//! Each scan is resolved against the directory, checked against the
//! presence registry, and turned into an outcome. Only valid entries and
//! valid exits mutate the registry, and each touches exactly one slot.

use checkpoint_core::{CheckpointResult, CredentialId, Lane, Outcome, ScanEvent, Timestamp};
use tracing::debug;

use crate::{CredentialDirectory, PresenceRegistry};

/// Presence state engine: owns the roster and the per-slot records
#[derive(Clone, Debug)]
pub struct PresenceEngine {
    directory: CredentialDirectory,
    registry: PresenceRegistry,
}

impl PresenceEngine {
    /// Fresh engine, every credential outside
    pub fn new(directory: CredentialDirectory) -> Self {
        let registry = PresenceRegistry::new(directory.len());
        PresenceEngine {
            directory,
            registry,
        }
    }

    pub fn directory(&self) -> &CredentialDirectory {
        &self.directory
    }

    pub fn registry(&self) -> &PresenceRegistry {
        &self.registry
    }

    /// Classify one scan.
    ///
    /// Not idempotent: a second identical entry scan after a valid one is
    /// a double entry.
    pub fn classify(
        &mut self,
        lane: Lane,
        credential_id: &CredentialId,
        now: Timestamp,
    ) -> CheckpointResult<Outcome> {
        // Stage 1: Resolve
        let Some(slot) = self.directory.resolve(credential_id) else {
            debug!(%lane, id = %credential_id, "unknown credential");
            return Ok(Outcome::UnknownCredential {
                lane,
                id: credential_id.clone(),
            });
        };

        // Stage 2: Current presence
        let inside = self
            .registry
            .get(slot)
            .is_some_and(|record| record.is_inside());

        // Stage 3: Lane rules
        let outcome = match (lane, inside) {
            // Existing entry time is preserved
            (Lane::Entry, true) => Outcome::DoubleEntry { slot },
            (Lane::Entry, false) => {
                self.registry.mark_entered(slot, now)?;
                Outcome::ValidEntry { slot }
            }
            (Lane::Exit, false) => Outcome::InvalidExit { slot },
            (Lane::Exit, true) => {
                let dwell = self.registry.mark_exited(slot, now)?;
                Outcome::ValidExit { slot, dwell }
            }
        };

        debug!(%lane, %slot, outcome = outcome.kind(), "classified scan");
        Ok(outcome)
    }

    /// Classify a scan event at its observation time
    pub fn process(&mut self, event: &ScanEvent) -> CheckpointResult<Outcome> {
        self.classify(event.lane, &event.credential_id, event.observed_at)
    }
}
