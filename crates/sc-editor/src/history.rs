//! Snapshot-based undo/redo.
//!
//! History is a bounded, linear list of full canvas snapshots with a cursor.
//! The entry under the cursor always equals the live canvas content, so
//! undo moves the cursor back and restores that entry, redo moves it
//! forward. Recording truncates everything after the cursor first.
//!
//! Gestures never record per frame: the store records once when the
//! gesture commits.

use sc_core::CanvasSnapshot;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept, the initial one included.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 50 }
    }
}

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<CanvasSnapshot>,
    index: usize,
    max_entries: usize,
}

impl History {
    /// Start a history whose first entry is `initial`.
    pub fn new(initial: CanvasSnapshot, config: HistoryConfig) -> Self {
        let max_entries = config.max_entries.max(1);
        let mut entries = VecDeque::with_capacity(max_entries);
        entries.push_back(initial);
        Self {
            entries,
            index: 0,
            max_entries,
        }
    }

    /// Append a snapshot after the cursor, dropping any redo entries.
    /// When full, the oldest entry is evicted and the cursor stays on the
    /// newest one.
    pub fn record(&mut self, snapshot: CanvasSnapshot) {
        self.entries.truncate(self.index + 1);
        self.entries.push_back(snapshot);
        if self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
        log::debug!("history: recorded entry {} of {}", self.index + 1, self.entries.len());
    }

    /// Overwrite the entry under the cursor without creating a new step.
    /// Used for view toggles that live in the snapshot but are not undoable.
    pub fn amend_current(&mut self, snapshot: CanvasSnapshot) {
        if let Some(entry) = self.entries.get_mut(self.index) {
            *entry = snapshot;
        }
    }

    /// Step back. Returns the snapshot to restore, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&CanvasSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        log::debug!("history: undo to entry {}", self.index);
        self.entries.get(self.index)
    }

    /// Step forward. Returns the snapshot to restore, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&CanvasSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        log::debug!("history: redo to entry {}", self.index);
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> Option<&CanvasSnapshot> {
        self.entries.get(self.index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sc_core::CanvasState;

    fn snap(grid: bool, bg: &str) -> CanvasSnapshot {
        CanvasState {
            grid_glow_enabled: grid,
            background: sc_core::Background::gradient(bg),
            ..Default::default()
        }
        .snapshot()
    }

    #[test]
    fn undo_and_redo_walk_the_cursor() {
        let mut history = History::new(snap(false, "midnight"), HistoryConfig::default());
        assert!(!history.can_undo());
        history.record(snap(false, "sunset"));
        history.record(snap(false, "aurora"));

        assert_eq!(history.undo(), Some(&snap(false, "sunset")));
        assert_eq!(history.undo(), Some(&snap(false, "midnight")));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(&snap(false, "sunset")));
        assert!(history.can_redo());
    }

    #[test]
    fn recording_truncates_the_future() {
        let mut history = History::new(snap(false, "midnight"), HistoryConfig::default());
        history.record(snap(false, "sunset"));
        history.record(snap(false, "aurora"));
        history.undo();
        history.undo();
        history.record(snap(true, "steel"));
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&snap(true, "steel")));
    }

    #[test]
    fn amend_rewrites_cursor_entry_only() {
        let mut history = History::new(snap(false, "midnight"), HistoryConfig::default());
        history.record(snap(false, "sunset"));
        history.amend_current(snap(true, "sunset"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), Some(&snap(true, "sunset")));
        assert_eq!(history.undo(), Some(&snap(false, "midnight")));
    }

    #[test]
    fn overflow_evicts_oldest_and_pins_cursor() {
        let mut history = History::new(snap(false, "g0"), HistoryConfig { max_entries: 3 });
        for i in 1..=5 {
            history.record(snap(false, &format!("g{i}")));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.undo(), Some(&snap(false, "g4")));
        assert_eq!(history.undo(), Some(&snap(false, "g3")));
        assert_eq!(history.undo(), None);
    }
}
