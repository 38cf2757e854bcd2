//! Event log - bounded circular history of notable outcomes
//!
//! Entry `n` (counting from zero over the whole run) lives at position
//! `n % capacity`. The total count is never reset.

use checkpoint_core::Timestamp;

/// Log capacity in the reference configuration
pub const DEFAULT_LOG_CAPACITY: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: Timestamp,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct EventLog {
    entries: Vec<LogEntry>,
    capacity: usize,
    total_count: u64,
}

impl EventLog {
    /// A capacity of zero is treated as one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        EventLog {
            entries: Vec::with_capacity(capacity),
            capacity,
            total_count: 0,
        }
    }

    /// Append, overwriting the oldest entry once full
    pub fn append(&mut self, message: impl Into<String>, timestamp: Timestamp) {
        let entry = LogEntry {
            timestamp,
            message: message.into(),
        };
        let pos = (self.total_count % self.capacity as u64) as usize;
        if pos < self.entries.len() {
            self.entries[pos] = entry;
        } else {
            self.entries.push(entry);
        }
        self.total_count += 1;
    }

    /// Retained entries, oldest first
    pub fn snapshot(&self) -> Vec<LogEntry> {
        if self.total_count <= self.capacity as u64 {
            return self.entries.clone();
        }
        let start = (self.total_count % self.capacity as u64) as usize;
        self.entries[start..]
            .iter()
            .chain(self.entries[..start].iter())
            .cloned()
            .collect()
    }

    /// Entries appended over the whole run
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;

    fn t(sec: u64) -> Timestamp {
        Timestamp::from_ymd_hms(2026, 10, 19, 8, 0, 0).unwrap() + Duration::from_secs(sec)
    }

    fn messages(log: &EventLog) -> Vec<String> {
        log.snapshot().into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn test_log_before_wrap() {
        let mut log = EventLog::default();
        log.append("a", t(0));
        log.append("b", t(1));
        assert_eq!(messages(&log), vec!["a", "b"]);
        assert_eq!(log.total_count(), 2);
    }

    #[test]
    fn test_log_fifteen_into_ten() {
        let mut log = EventLog::new(10);
        for i in 0..15 {
            log.append(format!("event {i}"), t(i));
        }

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 10);
        assert_eq!(log.total_count(), 15);
        for (k, entry) in snapshot.iter().enumerate() {
            let i = k as u64 + 5;
            assert_eq!(entry.message, format!("event {i}"));
            assert_eq!(entry.timestamp, t(i));
        }
    }

    #[test]
    fn test_log_exactly_full() {
        let mut log = EventLog::new(3);
        for m in ["a", "b", "c"] {
            log.append(m, t(0));
        }
        assert_eq!(messages(&log), vec!["a", "b", "c"]);
        log.append("d", t(1));
        assert_eq!(messages(&log), vec!["b", "c", "d"]);
    }

    proptest! {
        #[test]
        fn prop_snapshot_is_last_window(capacity in 1usize..16, count in 0u64..64) {
            let mut log = EventLog::new(capacity);
            for i in 0..count {
                log.append(i.to_string(), t(i));
            }

            let expected: Vec<String> = (count.saturating_sub(capacity as u64)..count)
                .map(|i| i.to_string())
                .collect();
            prop_assert_eq!(messages(&log), expected);
            prop_assert_eq!(log.total_count(), count);
        }
    }
}
