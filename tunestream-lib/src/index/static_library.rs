//! Library index over a fixed set of entries

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use crate::error::{LibraryError, Result};
use crate::types::Entry;

use super::{Library, Snapshot};

/// Serves a snapshot built up front. `scan` and `refresh` never touch the
/// filesystem.
#[derive(Debug)]
pub struct StaticLibrary {
    root: PathBuf,
    snapshot: Snapshot,
    created_at: DateTime<Utc>,
}

impl StaticLibrary {
    pub fn new<P: Into<PathBuf>>(root: P, entries: Vec<Entry>) -> Self {
        Self {
            root: root.into(),
            snapshot: Snapshot::from_entries(entries),
            created_at: Utc::now(),
        }
    }
}

impl Library for StaticLibrary {
    fn scan(&self, cancel: &CancellationToken) -> Result<Vec<Entry>> {
        if cancel.is_cancelled() {
            return Err(LibraryError::Cancelled);
        }
        Ok(self.snapshot.entries().to_vec())
    }

    fn refresh(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(LibraryError::Cancelled);
        }
        Ok(())
    }

    fn lookup(&self, id: &str) -> Result<Entry> {
        self.snapshot
            .get(id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    fn list(&self) -> Vec<Entry> {
        self.snapshot.entries().to_vec()
    }

    fn count(&self) -> usize {
        self.snapshot.len()
    }

    fn last_scan(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
