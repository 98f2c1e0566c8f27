use std::collections::VecDeque;
use std::sync::Arc;

use super::snapshot::Snapshot;

const DEFAULT_CAPACITY: usize = 120;

/// Bounded trail of past snapshots, oldest evicted first.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    entries: VecDeque<Arc<Snapshot>>,
    capacity: usize,
}

impl SnapshotHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, snapshot: Arc<Snapshot>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    pub fn latest(&self) -> Option<&Arc<Snapshot>> {
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

    /// Ordered copy for publishing, oldest first.
    pub fn to_vec(&self) -> Vec<Arc<Snapshot>> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ts: u64) -> Arc<Snapshot> {
        Arc::new(Snapshot {
            timestamp_ms: ts,
            ..Snapshot::default()
        })
    }

    #[test]
    fn record_keeps_order() {
        let mut history = SnapshotHistory::new(60);
        history.record(at(1));
        history.record(at(2));
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().timestamp_ms, 2);
        let stamps: Vec<u64> = history.to_vec().iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(stamps, vec![1, 2]);
    }

    #[test]
    fn ring_buffer_caps_at_capacity() {
        let mut history = SnapshotHistory::new(5);
        for i in 0..10 {
            history.record(at(i));
        }
        let entries = history.to_vec();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].timestamp_ms, 5);
        assert_eq!(entries[4].timestamp_ms, 9);
    }

    #[test]
    fn zero_capacity_still_holds_latest() {
        let mut history = SnapshotHistory::new(0);
        history.record(at(1));
        history.record(at(2));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().timestamp_ms, 2);
    }
}
