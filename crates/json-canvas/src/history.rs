//! Snapshot history with linear undo/redo.
//!
//! Each committed mutation records a deep copy of the node collection.
//! The history is an ordered list plus a pointer; recording after an undo
//! truncates the redo tail — a new edit erases the undone branch, it never
//! merges with it.

use std::time::SystemTime;

use crate::node::NodeCollection;

/// One recorded state: an immutable copy of the collection plus a
/// human-readable description of the mutation that produced it.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub collection: NodeCollection,
    pub description: String,
    pub timestamp: SystemTime,
}

/// Ordered snapshot list with a pointer into it. `pointer == None` means
/// nothing has been recorded yet.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    pointer: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a snapshot, discarding any entries past the pointer.
    pub fn record(&mut self, collection: &NodeCollection, description: impl Into<String>) {
        let keep = self.pointer.map(|p| p + 1).unwrap_or(0);
        self.entries.truncate(keep);
        self.entries.push(HistoryEntry {
            collection: collection.clone(),
            description: description.into(),
            timestamp: SystemTime::now(),
        });
        self.pointer = Some(self.entries.len() - 1);
    }

    /// Steps back one entry and returns it; `None` when already at the
    /// earliest entry (or nothing was recorded).
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        match self.pointer {
            Some(p) if p > 0 => {
                self.pointer = Some(p - 1);
                self.entries.get(p - 1)
            }
            _ => None,
        }
    }

    /// Steps forward one entry and returns it; `None` at the latest entry.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        match self.pointer {
            Some(p) if p + 1 < self.entries.len() => {
                self.pointer = Some(p + 1);
                self.entries.get(p + 1)
            }
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.pointer, Some(p) if p > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.pointer, Some(p) if p + 1 < self.entries.len())
    }

    /// Drops all entries (used when a new document loads).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pointer = None;
    }

    /// Descriptions from oldest to newest, for a history panel.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.description.as_str())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
