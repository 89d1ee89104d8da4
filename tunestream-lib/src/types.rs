//! Shared data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default cache TTL applied when none (or zero) is configured
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Extensions indexed when none are configured
pub const DEFAULT_FORMATS: &[&str] = &[".mp3"];

/// One indexed audio file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Content identifier derived from `file_path`
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Duration in whole seconds, 0 when the tag reader could not tell
    pub duration_secs: u64,
    /// Absolute path of the file
    pub file_path: PathBuf,
    pub file_name: String,
    /// Size in bytes at scan time
    pub file_size: u64,
    /// Lower-cased, dot-prefixed extension (e.g. ".mp3")
    pub format: String,
    /// File modification time at scan time
    pub added_at: DateTime<Utc>,
}

/// Library index configuration
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Root directory of the music library
    pub root: PathBuf,
    /// Supported extensions, matched case-insensitively
    pub supported_formats: Vec<String>,
    /// Maximum age of a cached snapshot
    pub cache_ttl: Duration,
}

impl LibraryConfig {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            supported_formats: DEFAULT_FORMATS.iter().map(|s| s.to_string()).collect(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Supported extensions lower-cased and dot-prefixed, falling back to
    /// the defaults when the list is empty
    pub fn normalized_formats(&self) -> Vec<String> {
        let formats: Vec<String> = self
            .supported_formats
            .iter()
            .map(|f| normalize_extension(f))
            .filter(|f| f.len() > 1)
            .collect();
        if formats.is_empty() {
            DEFAULT_FORMATS.iter().map(|s| s.to_string()).collect()
        } else {
            formats
        }
    }

    /// TTL with the zero case replaced by the default
    pub fn effective_ttl(&self) -> Duration {
        if self.cache_ttl.is_zero() {
            DEFAULT_CACHE_TTL
        } else {
            self.cache_ttl
        }
    }
}

/// Lower-case an extension and make sure it starts with a dot
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".MP3"), ".mp3");
        assert_eq!(normalize_extension("flac"), ".flac");
        assert_eq!(normalize_extension(" .Ogg "), ".ogg");
    }

    #[test]
    fn test_normalized_formats_default() {
        let config = LibraryConfig::new("/music").with_formats(Vec::<String>::new());
        assert_eq!(config.normalized_formats(), vec![".mp3".to_string()]);

        let config = LibraryConfig::new("/music").with_formats([".FLAC", "wav", ""]);
        assert_eq!(
            config.normalized_formats(),
            vec![".flac".to_string(), ".wav".to_string()]
        );
    }

    #[test]
    fn test_effective_ttl() {
        let config = LibraryConfig::new("/music").with_cache_ttl(Duration::ZERO);
        assert_eq!(config.effective_ttl(), DEFAULT_CACHE_TTL);

        let config = LibraryConfig::new("/music").with_cache_ttl(Duration::from_secs(60));
        assert_eq!(config.effective_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_entry_serializes_snake_case() {
        let entry = Entry {
            id: "0123456789abcdef0123456789abcdef".to_string(),
            title: "Song".to_string(),
            artist: "Unknown".to_string(),
            album: "Unknown".to_string(),
            duration_secs: 0,
            file_path: PathBuf::from("/music/song.mp3"),
            file_name: "song.mp3".to_string(),
            file_size: 11,
            format: ".mp3".to_string(),
            added_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["file_path"], "/music/song.mp3");
        assert_eq!(json["file_size"], 11);
        assert_eq!(json["format"], ".mp3");
        assert!(json["added_at"].as_str().unwrap().starts_with("1970-01-01"));
    }
}
