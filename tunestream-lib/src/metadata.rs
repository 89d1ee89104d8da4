//! Entry construction and tag metadata
//!
//! Tag reading is delegated to lofty. Any failure there falls back to
//! values derived from the file name.

use chrono::{DateTime, Utc};
use lofty::prelude::*;
use std::fs;
use std::path::Path;

use crate::id::content_id;
use crate::types::{normalize_extension, Entry};

/// Artist/album placeholder when the tags carry nothing
pub const UNKNOWN: &str = "Unknown";

/// Tag fields read from a file
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TagInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_secs: u64,
}

/// Read tags from an audio file, returning empty info on failure
pub fn read_tags(path: &Path) -> TagInfo {
    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            tracing::trace!("No readable tags in {:?}: {}", path, e);
            return TagInfo::default();
        }
    };

    let mut info = TagInfo {
        duration_secs: tagged.properties().duration().as_secs(),
        ..Default::default()
    };

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        info.title = non_blank(tag.title().as_deref());
        info.artist = non_blank(tag.artist().as_deref());
        info.album = non_blank(tag.album().as_deref());
    }

    info
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Build an entry for `path` from its filesystem metadata and tags
pub fn build_entry(path: &Path, meta: &fs::Metadata) -> Entry {
    entry_with_tags(path, meta, read_tags(path))
}

pub(crate) fn entry_with_tags(path: &Path, meta: &fs::Metadata, tags: TagInfo) -> Entry {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.clone());
    let format = path
        .extension()
        .map(|e| normalize_extension(&e.to_string_lossy()))
        .unwrap_or_default();
    let added_at = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Entry {
        id: content_id(path),
        title: tags.title.unwrap_or(stem),
        artist: tags.artist.unwrap_or_else(|| UNKNOWN.to_string()),
        album: tags.album.unwrap_or_else(|| UNKNOWN.to_string()),
        duration_secs: tags.duration_secs,
        file_path: path.to_path_buf(),
        file_name,
        file_size: meta.len(),
        format,
        added_at,
    }
}
