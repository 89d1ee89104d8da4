//! TTL-cached library index backed by a directory walk

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::{LibraryError, Result};
use crate::types::{Entry, LibraryConfig};

use super::{walk_library, Library, Snapshot};

/// Snapshot plus the time it was taken
#[derive(Debug, Default)]
struct IndexState {
    snapshot: Snapshot,
    scanned_at: Option<Instant>,
    scanned_at_wall: Option<DateTime<Utc>>,
}

/// Library index that walks its root directory and caches the result.
///
/// A single reader/writer lock guards the snapshot. Cache hits and lookups
/// only take the read side; a rescan holds the write side for the whole
/// walk, so at most one walk runs at a time per instance.
#[derive(Debug)]
pub struct MusicLibrary {
    root: PathBuf,
    formats: Vec<String>,
    ttl: Duration,
    state: RwLock<IndexState>,
    walks: AtomicU64,
}

impl MusicLibrary {
    pub fn new(config: LibraryConfig) -> Self {
        let root = std::path::absolute(&config.root).unwrap_or_else(|_| config.root.clone());
        Self {
            formats: config.normalized_formats(),
            ttl: config.effective_ttl(),
            root,
            state: RwLock::new(IndexState::default()),
            walks: AtomicU64::new(0),
        }
    }

    /// Supported extensions, normalised
    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn cache_ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of completed directory walks since creation
    pub fn walk_count(&self) -> u64 {
        self.walks.load(Ordering::SeqCst)
    }

    fn is_fresh(&self, state: &IndexState) -> bool {
        !state.snapshot.is_empty()
            && state
                .scanned_at
                .map(|at| at.elapsed() < self.ttl)
                .unwrap_or(false)
    }

    /// Walk the root and publish the result. Caller holds the write lock.
    fn rescan(&self, state: &mut IndexState, cancel: &CancellationToken) -> Result<()> {
        let started = Instant::now();
        let snapshot = match walk_library(&self.root, &self.formats, cancel) {
            Ok(s) => s,
            Err(e) => {
                match &e {
                    LibraryError::Cancelled => {
                        tracing::info!("Scan of {:?} cancelled", self.root)
                    }
                    _ => tracing::error!("Scan of {:?} failed: {}", self.root, e),
                }
                return Err(e);
            }
        };

        self.walks.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            "Indexed {} file(s) under {:?} in {:?}",
            snapshot.len(),
            self.root,
            started.elapsed()
        );

        state.snapshot = snapshot;
        state.scanned_at = Some(Instant::now());
        state.scanned_at_wall = Some(Utc::now());
        Ok(())
    }
}

impl Library for MusicLibrary {
    fn scan(&self, cancel: &CancellationToken) -> Result<Vec<Entry>> {
        {
            let state = self.state.read();
            if self.is_fresh(&state) {
                return Ok(state.snapshot.entries().to_vec());
            }
        }

        let mut state = self.state.write();
        // Another caller may have rescanned while we waited for the lock.
        if self.is_fresh(&state) {
            tracing::debug!("Snapshot refreshed by a concurrent scan");
            return Ok(state.snapshot.entries().to_vec());
        }

        self.rescan(&mut state, cancel)?;
        Ok(state.snapshot.entries().to_vec())
    }

    fn refresh(&self, cancel: &CancellationToken) -> Result<()> {
        let mut state = self.state.write();
        self.rescan(&mut state, cancel)
    }

    fn lookup(&self, id: &str) -> Result<Entry> {
        self.state
            .read()
            .snapshot
            .get(id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    fn list(&self) -> Vec<Entry> {
        self.state.read().snapshot.entries().to_vec()
    }

    fn count(&self) -> usize {
        self.state.read().snapshot.len()
    }

    fn last_scan(&self) -> Option<DateTime<Utc>> {
        self.state.read().scanned_at_wall
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
