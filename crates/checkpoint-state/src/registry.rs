//! Presence registry - per-slot inside/outside state
//!
//! A record holds its entry time only while the credential is inside, so
//! "inside" and "entry time is set" cannot disagree.

use std::time::Duration;

use checkpoint_core::{CheckpointError, CheckpointResult, SlotIndex, Timestamp};

/// Presence of one slot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PresenceRecord {
    entered_at: Option<Timestamp>,
}

impl PresenceRecord {
    #[inline]
    pub fn is_inside(&self) -> bool {
        self.entered_at.is_some()
    }

    #[inline]
    pub fn entry_time(&self) -> Option<Timestamp> {
        self.entered_at
    }
}

/// Presence records indexed by slot
#[derive(Clone, Debug, Default)]
pub struct PresenceRegistry {
    records: Vec<PresenceRecord>,
}

impl PresenceRegistry {
    /// Registry with `slots` records, everyone outside
    pub fn new(slots: usize) -> Self {
        PresenceRegistry {
            records: vec![PresenceRecord::default(); slots],
        }
    }

    pub fn get(&self, slot: SlotIndex) -> Option<&PresenceRecord> {
        self.records.get(slot.get())
    }

    fn record_mut(&mut self, slot: SlotIndex) -> CheckpointResult<&mut PresenceRecord> {
        self.records
            .get_mut(slot.get())
            .ok_or(CheckpointError::UnknownSlot(slot))
    }

    /// Record an entry at `at`. The slot must be outside.
    pub fn mark_entered(&mut self, slot: SlotIndex, at: Timestamp) -> CheckpointResult<()> {
        let record = self.record_mut(slot)?;
        if record.is_inside() {
            return Err(CheckpointError::AlreadyInside(slot));
        }
        record.entered_at = Some(at);
        Ok(())
    }

    /// Record an exit at `now`, returning the dwell duration.
    /// The slot must be inside.
    pub fn mark_exited(&mut self, slot: SlotIndex, now: Timestamp) -> CheckpointResult<Duration> {
        let record = self.record_mut(slot)?;
        let entered_at = record.entered_at.take().ok_or(CheckpointError::NotInside(slot))?;
        Ok(now - entered_at)
    }

    /// Slots currently inside, in slot order, with their entry times
    pub fn inside(&self) -> impl Iterator<Item = (SlotIndex, Timestamp)> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.entered_at.map(|at| (SlotIndex::new(i), at)))
    }

    pub fn inside_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_inside()).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
