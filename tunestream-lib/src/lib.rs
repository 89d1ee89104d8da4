//! Core of the tunestream music server.
//!
//! Walks a directory tree of audio files into an in-memory, time-bounded
//! index and serves individual files with HTTP byte-range semantics.

pub mod error;
pub mod id;
pub mod index;
pub mod metadata;
pub mod stream;
pub mod types;

pub use error::{LibraryError, Result};
pub use id::{content_id, is_valid_id};
pub use index::{Library, MusicLibrary, Snapshot, StaticLibrary};
pub use stream::{ByteRange, ByteSource, RangeError, StreamEngine, StreamResponse};
pub use types::{Entry, LibraryConfig};

/// Re-exported so callers can drive cancellation without depending on
/// tokio-util directly.
pub use tokio_util::sync::CancellationToken;
