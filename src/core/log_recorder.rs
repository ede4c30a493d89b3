//! Bounded system log
//!
//! Keeps the most recent entries in insertion order, dropping the oldest
//! once capacity is exceeded.

use std::collections::VecDeque;

use chrono::NaiveTime;

use crate::core::clock::format_timestamp;
use crate::types::{LogEntry, Severity};
use crate::LOG_CAPACITY;

#[derive(Debug, Clone)]
pub struct LogRecorder {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl Default for LogRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl LogRecorder {
    /// Recorder with the standard capacity of 10
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Append an entry stamped with `at`, evicting the oldest if full
    pub fn record(&mut self, message: impl Into<String>, severity: Severity, at: NaiveTime) -> &LogEntry {
        let entry = LogEntry::new(self.next_id, format_timestamp(at), message.into(), severity);
        self.next_id += 1;

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Owned copy, oldest first
    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all entries. Ids keep counting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
