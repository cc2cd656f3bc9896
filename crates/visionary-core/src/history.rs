//! Bounded log of committed canvas snapshots.

use crate::canvas::CanvasState;
use crate::time::now_millis;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of snapshots kept by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// A committed canvas snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub state: CanvasState,
    /// Commit time in milliseconds since the UNIX epoch.
    pub timestamp: u64,
}

/// Append-only history, most recent entry first.
///
/// Once the capacity is exceeded the oldest entries are dropped.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Create an empty buffer keeping at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Snapshot `state` as the newest entry.
    pub fn record(&mut self, state: &CanvasState) {
        self.entries.push_front(HistoryEntry {
            state: state.clone(),
            timestamp: now_millis(),
        });
        self.entries.truncate(self.capacity);
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Entry `index` steps back from the newest (0 = newest).
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
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

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> CanvasState {
        CanvasState::new(name)
    }

    #[test]
    fn test_record_newest_first() {
        let mut history = HistoryBuffer::new(5);
        history.record(&named("a"));
        history.record(&named("b"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().state.project_name, "b");
        assert_eq!(history.get(1).unwrap().state.project_name, "a");
    }

    #[test]
    fn test_bound_drops_oldest() {
        let mut history = HistoryBuffer::new(20);
        for i in 0..25 {
            history.record(&named(&format!("commit-{i}")));
        }

        assert_eq!(history.len(), 20);
        let names: Vec<_> = history.iter().map(|e| e.state.project_name.clone()).collect();
        let expected: Vec<_> = (5..25).rev().map(|i| format!("commit-{i}")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut history = HistoryBuffer::default();
        let mut state = named("before");
        history.record(&state);

        state.project_name = "after".to_string();
        assert_eq!(history.latest().unwrap().state.project_name, "before");
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut history = HistoryBuffer::new(0);
        history.record(&named("a"));
        assert!(history.is_empty());
    }
}
