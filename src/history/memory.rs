//! Bounded in-memory history, for hosts that run without a database.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{HistoryError, HistoryRecord, HistoryStore};

/// Ring buffer of the most recent records; the oldest is evicted at capacity.
#[derive(Debug)]
pub struct MemoryHistoryStore {
    records: Mutex<VecDeque<HistoryRecord>>,
    capacity: usize,
}

impl MemoryHistoryStore {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Up to `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> Vec<HistoryRecord> {
        match self.records.lock() {
            Ok(records) => records.iter().rev().take(limit).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| HistoryError::Lock(e.to_string()))?;
        if self.capacity == 0 {
            return Ok(());
        }
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn evicts_oldest_at_capacity() {
        let store = MemoryHistoryStore::new(2);
        for cmd in ["one", "two", "three"] {
            store.append(&HistoryRecord::now(cmd, "ok", true)).unwrap();
        }
        let recent = store.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].command, "three");
        assert_eq!(recent[1].command, "two");
    }

    #[test]
    fn starts_empty() {
        let store = MemoryHistoryStore::new(4);
        assert!(store.is_empty());
        assert!(store.recent(3).is_empty());
    }
}
