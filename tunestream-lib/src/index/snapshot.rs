use std::collections::HashMap;

use crate::types::Entry;

/// Entries produced by one scan, plus an id index over them.
///
/// Built once and never mutated; a rescan produces a new snapshot.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    entries: Vec<Entry>,
    by_id: HashMap<String, usize>,
}

impl Snapshot {
    /// Build a snapshot, dropping any later entry whose id repeats an
    /// earlier one so that the list and the index stay one-to-one.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        let mut kept = Vec::with_capacity(entries.len());
        let mut by_id = HashMap::with_capacity(entries.len());

        for entry in entries {
            if by_id.contains_key(&entry.id) {
                tracing::warn!(
                    "Duplicate content id {} for {:?}, skipping",
                    entry.id,
                    entry.file_path
                );
                continue;
            }
            by_id.insert(entry.id.clone(), kept.len());
            kept.push(entry);
        }

        Self {
            entries: kept,
            by_id,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.by_id.get(id).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
