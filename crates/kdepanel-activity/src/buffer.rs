use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::{ActivityEntry, ActivityKind};

/// Thread-safe ring buffer for activity lines
#[derive(Clone)]
pub struct ActivityLog {
    /// Internal storage
    entries: Arc<RwLock<VecDeque<ActivityEntry>>>,

    /// Maximum capacity
    capacity: usize,

    /// Next entry ID
    next_id: Arc<AtomicU64>,
}

impl ActivityLog {
    /// Create a new activity log with the given capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Push a new entry, evicting oldest if at capacity
    pub fn push(&self, mut entry: ActivityEntry) {
        entry.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.write();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Record one line of the given kind
    pub fn record(&self, kind: ActivityKind, text: impl Into<String>) {
        self.push(ActivityEntry::new(kind, text));
    }

    /// Record multi-line text, one entry per line
    pub fn record_lines(&self, kind: ActivityKind, text: &str) {
        for line in text.lines() {
            self.record(kind, line);
        }
    }

    /// Separate one command's lines from the previous one
    pub fn blank_line(&self) {
        self.record(ActivityKind::Output, "");
    }

    /// Get all entries (cloned for rendering)
    pub fn all(&self) -> Vec<ActivityEntry> {
        self.entries.read().iter().cloned().collect()
    }

    /// Get entries filtered by a predicate
    pub fn filtered<F>(&self, predicate: F) -> Vec<ActivityEntry>
    where
        F: Fn(&ActivityEntry) -> bool,
    {
        self.entries
            .read()
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    /// Get entry count per kind
    pub fn counts(&self) -> ActivityCounts {
        let entries = self.entries.read();
        let mut counts = ActivityCounts::default();

        for entry in entries.iter() {
            match entry.kind {
                ActivityKind::Command => counts.commands += 1,
                ActivityKind::Error => counts.errors += 1,
                ActivityKind::Cwd | ActivityKind::Output | ActivityKind::Info => {
                    counts.other += 1
                }
            }
        }

        counts
    }

    /// Total entry count
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Clear all entries
    pub fn clear(&self) {
        self.entries.write().clear();
        self.next_id.store(0, Ordering::SeqCst);
    }
}

/// Counts per activity kind
#[derive(Clone, Debug, Default)]
pub struct ActivityCounts {
    pub commands: usize,
    pub errors: usize,
    pub other: usize,
}

impl ActivityCounts {
    pub fn total(&self) -> usize {
        self.commands + self.errors + self.other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_evicts_oldest() {
        let log = ActivityLog::new(2);
        log.record(ActivityKind::Command, "kde ls");
        log.record(ActivityKind::Output, "dev");
        log.record(ActivityKind::Output, "staging");

        let all = log.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text, "dev");
        assert_eq!(all[1].text, "staging");
        assert_eq!(all[1].id, 2);
    }

    #[test]
    fn test_record_lines_and_counts() {
        let log = ActivityLog::new(100);
        log.record(ActivityKind::Command, "kde project ls");
        log.record_lines(ActivityKind::Output, "api\nweb\n");
        log.record(ActivityKind::Error, "no such environment");

        let counts = log.counts();
        assert_eq!(counts.commands, 1);
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(log.all()[3].display(), "[error] no such environment");
    }

    #[test]
    fn test_clear_restarts_ids() {
        let log = ActivityLog::new(10);
        log.record(ActivityKind::Command, "kde ls");
        log.record(ActivityKind::Cwd, "/work");
        assert_eq!(log.len(), 2);

        log.clear();
        assert!(log.is_empty());
        log.record(ActivityKind::Command, "kde status json");
        assert_eq!(log.all()[0].id, 0);
    }
}
