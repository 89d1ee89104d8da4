//! Library index
//!
//! This module owns the in-memory view of the music directory:
//! - `Library`: the capability set every index variant offers
//! - `MusicLibrary`: walks the root and caches the result for a TTL
//! - `StaticLibrary`: serves a fixed, pre-built snapshot
//! - `Snapshot`: an immutable, internally consistent set of entries

pub mod library;
pub mod scanner;
pub mod snapshot;
pub mod static_library;

use chrono::{DateTime, Utc};
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::types::Entry;

pub use library::MusicLibrary;
pub use scanner::walk_library;
pub use snapshot::Snapshot;
pub use static_library::StaticLibrary;

/// Operations offered by every library index.
///
/// `scan` and `refresh` may block on filesystem I/O. The readers can wait
/// behind a walk in progress, so async callers should run all of them on
/// a blocking thread.
pub trait Library: Send + Sync {
    /// Return the cached entries if still fresh, otherwise rescan first.
    fn scan(&self, cancel: &CancellationToken) -> Result<Vec<Entry>>;

    /// Rescan unconditionally, replacing the snapshot on success.
    fn refresh(&self, cancel: &CancellationToken) -> Result<()>;

    /// Find an entry in the current snapshot. Never triggers a scan.
    fn lookup(&self, id: &str) -> Result<Entry>;

    /// Copy of the current snapshot's entries. Never triggers a scan.
    fn list(&self) -> Vec<Entry>;

    /// Number of entries in the current snapshot.
    fn count(&self) -> usize;

    /// Wall-clock time of the last successful scan.
    fn last_scan(&self) -> Option<DateTime<Utc>>;

    /// Root directory this index covers.
    fn root(&self) -> &Path;
}
