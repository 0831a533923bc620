//! Bounded linear undo history of serialized document snapshots

use std::collections::VecDeque;

use tracing::debug;

/// Number of snapshots kept by default
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Snapshot history with a cursor
///
/// Recording after an undo discards the snapshots past the cursor. When the
/// limit is exceeded the oldest snapshot is evicted and the cursor shifts
/// with it.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    entries: VecDeque<String>,
    cursor: Option<usize>,
    limit: usize,
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl SnapshotHistory {
    /// Create an empty history holding at most `limit` snapshots
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit + 1),
            cursor: None,
            limit,
        }
    }

    /// Push a snapshot at the cursor, dropping any redo branch
    pub fn record(&mut self, snapshot: String) {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        if keep < self.entries.len() {
            debug!(discarded = self.entries.len() - keep, "truncating redo branch");
            self.entries.truncate(keep);
        }

        self.entries.push_back(snapshot);
        self.cursor = Some(self.entries.len() - 1);

        if self.entries.len() > self.limit {
            self.entries.pop_front();
            self.cursor = self.cursor.map(|cursor| cursor.saturating_sub(1));
            debug!(limit = self.limit, "evicted oldest snapshot");
        }
    }

    /// Step back and return the snapshot now under the cursor
    pub fn undo(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        let cursor = self.cursor? - 1;
        self.cursor = Some(cursor);
        self.entries.get(cursor).map(String::as_str)
    }

    /// Step forward and return the snapshot now under the cursor
    pub fn redo(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        let cursor = self.cursor.map_or(0, |cursor| cursor + 1);
        self.cursor = Some(cursor);
        self.entries.get(cursor).map(String::as_str)
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        match self.cursor {
            Some(cursor) => cursor + 1 < self.entries.len(),
            None => !self.entries.is_empty(),
        }
    }

    /// Snapshot under the cursor
    pub fn current(&self) -> Option<&str> {
        self.cursor
            .and_then(|cursor| self.entries.get(cursor))
            .map(String::as_str)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(count: usize) -> SnapshotHistory {
        let mut history = SnapshotHistory::default();
        for i in 0..count {
            history.record(format!("s{i}"));
        }
        history
    }

    #[test]
    fn test_undo_redo_walk() {
        let mut history = filled(3);
        assert_eq!(history.cursor(), Some(2));
        assert!(!history.can_redo());

        assert_eq!(history.undo(), Some("s1"));
        assert_eq!(history.undo(), Some("s0"));
        assert_eq!(history.undo(), None);
        assert_eq!(history.cursor(), Some(0));

        assert_eq!(history.redo(), Some("s1"));
        assert_eq!(history.redo(), Some("s2"));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_record_truncates_redo_branch() {
        let mut history = filled(4);
        history.undo();
        history.undo();
        history.record("branch".to_string());

        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some("branch"));
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some("s1"));
    }

    #[test]
    fn test_bounded_to_limit() {
        let mut history = filled(75);
        assert_eq!(history.len(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(history.cursor(), Some(DEFAULT_HISTORY_LIMIT - 1));
        assert_eq!(history.current(), Some("s74"));

        while history.undo().is_some() {}
        assert_eq!(history.current(), Some("s45"));
    }

    #[test]
    fn test_empty_history() {
        let mut history = SnapshotHistory::new(0);
        assert_eq!(history.limit(), 1);
        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
    }
}
