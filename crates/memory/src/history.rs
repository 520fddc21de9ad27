use crate::types::HistoryEntry;
use parking_lot::Mutex;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// In-memory ring buffer of recent exchanges. The oldest entry is evicted
/// once capacity is reached.
pub struct CommandHistory {
    capacity: usize,
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, entry: HistoryEntry) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Up to `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        self.entries.lock().iter().rev().take(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let history = CommandHistory::new(3);
        for i in 0..5 {
            history.push(HistoryEntry::new(format!("q{}", i), format!("r{}", i)));
        }

        assert_eq!(history.len(), 3);
        let queries: Vec<_> = history.recent(10).into_iter().map(|e| e.query).collect();
        assert_eq!(queries, vec!["q4", "q3", "q2"]);
    }

    #[test]
    fn test_recent_limit_and_clear() {
        let history = CommandHistory::default();
        assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);

        history.push(HistoryEntry::new("open calculator", "calc").with_command("calc", Some(true)));
        history.push(HistoryEntry::new("hello", "Hi there"));

        let latest = history.recent(1);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].query, "hello");
        assert!(latest[0].command.is_none());

        history.clear();
        assert!(history.is_empty());
    }
}
