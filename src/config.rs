//! Server configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tunestream_lib::stream::DEFAULT_MAX_RANGE_SIZE;
use tunestream_lib::LibraryConfig;

use crate::error::{Result, ServerError};

pub const DEFAULT_PORT: u16 = 8080;

/// Upper bound for `max_range_size` (500 MiB)
pub const MAX_RANGE_SIZE_LIMIT: u64 = 500 * 1024 * 1024;

pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 5;
pub const MAX_CACHE_TTL_MINUTES: u64 = 24 * 60;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Music library configuration
#[derive(Debug, Clone)]
pub struct MusicConfig {
    /// Root directory of the library
    pub directory: PathBuf,

    /// Extensions to index, e.g. ".mp3"
    pub supported_formats: Vec<String>,

    /// Index cache lifetime in minutes (0 means the default)
    pub cache_ttl_minutes: u64,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            directory: default_music_directory(),
            supported_formats: [".mp3", ".flac", ".wav", ".m4a", ".ogg"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cache_ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
        }
    }
}

impl MusicConfig {
    pub fn cache_ttl(&self) -> Duration {
        let minutes = if self.cache_ttl_minutes == 0 {
            DEFAULT_CACHE_TTL_MINUTES
        } else {
            self.cache_ttl_minutes
        };
        Duration::from_secs(minutes * 60)
    }

    pub fn library_config(&self) -> LibraryConfig {
        LibraryConfig::new(&self.directory)
            .with_formats(self.supported_formats.iter())
            .with_cache_ttl(self.cache_ttl())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
    /// Also append logs to this file; stdout only when unset
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Largest byte range served in one response
    pub max_range_size: u64,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Include internal error details in API error bodies
    pub expose_error_details: bool,

    pub music: MusicConfig,

    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_range_size: DEFAULT_MAX_RANGE_SIZE,
            cors_enabled: true,
            expose_error_details: false,
            music: MusicConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply `TUNESTREAM_*` variables from the process environment.
    ///
    /// Runs before logging is up, so rejected values are returned for the
    /// caller to log.
    pub fn apply_env_overrides(&mut self) -> Vec<String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Values that fail to parse are skipped
    /// and reported in the returned list.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();

        if let Some(host) = lookup("TUNESTREAM_SERVER_HOST").filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(port) = parse_override(&lookup, "TUNESTREAM_SERVER_PORT", &mut rejected) {
            self.port = port;
        }
        if let Some(size) = parse_override(&lookup, "TUNESTREAM_MAX_RANGE_SIZE", &mut rejected) {
            self.max_range_size = size;
        }
        if let Some(dir) = lookup("TUNESTREAM_MUSIC_DIRECTORY").filter(|d| !d.is_empty()) {
            self.music.directory = PathBuf::from(dir);
        }
        if let Some(ttl) = parse_override(&lookup, "TUNESTREAM_CACHE_TTL_MINUTES", &mut rejected)
        {
            self.music.cache_ttl_minutes = ttl;
        }
        if let Some(file) = lookup("TUNESTREAM_LOG_FILE").filter(|f| !f.is_empty()) {
            self.logging.file = Some(PathBuf::from(file));
        }

        rejected
    }

    /// Make the music directory absolute
    pub fn resolve_paths(&mut self) {
        if let Ok(dir) = std::path::absolute(&self.music.directory) {
            self.music.directory = dir;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(ServerError::Config("server.host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ServerError::Config("server.port must be 1-65535".into()));
        }
        if self.max_range_size == 0 || self.max_range_size > MAX_RANGE_SIZE_LIMIT {
            return Err(ServerError::Config(format!(
                "server.max_range_size must be 1-{} bytes, got {}",
                MAX_RANGE_SIZE_LIMIT, self.max_range_size
            )));
        }
        if self.music.directory.as_os_str().is_empty() {
            return Err(ServerError::Config("music.directory must not be empty".into()));
        }
        if self.music.cache_ttl_minutes > MAX_CACHE_TTL_MINUTES {
            return Err(ServerError::Config(format!(
                "music.cache_ttl_minutes must be at most {}, got {}",
                MAX_CACHE_TTL_MINUTES, self.music.cache_ttl_minutes
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ServerError::Config(format!(
                "logging.level must be one of {:?}, got {:?}",
                LOG_LEVELS, self.logging.level
            )));
        }
        Ok(())
    }
}

fn parse_override<T, F>(lookup: &F, key: &str, rejected: &mut Vec<String>) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            rejected.push(format!("Ignoring invalid value for {}: {:?}", key, raw));
            None
        }
    }
}

/// `$HOME/Music` if it exists, otherwise `./music`
pub fn default_music_directory() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join("Music"))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from("./music"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_range_size, 100 * 1024 * 1024);
        assert!(config.cors_enabled);
        assert!(!config.expose_error_details);
        assert_eq!(config.music.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            ..Default::default()
        };
        assert_eq!(config.socket_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_zero_ttl_uses_default() {
        let music = MusicConfig {
            cache_ttl_minutes: 0,
            ..Default::default()
        };
        assert_eq!(music.cache_ttl(), Duration::from_secs(300));

        let music = MusicConfig {
            cache_ttl_minutes: 30,
            ..Default::default()
        };
        assert_eq!(music.cache_ttl(), Duration::from_secs(1800));
    }

    #[test]
    fn test_library_config() {
        let music = MusicConfig {
            directory: PathBuf::from("/srv/music"),
            supported_formats: vec!["FLAC".to_string(), ".mp3".to_string()],
            cache_ttl_minutes: 10,
        };
        let lib = music.library_config();
        assert_eq!(lib.root, PathBuf::from("/srv/music"));
        assert_eq!(lib.normalized_formats(), vec![".flac", ".mp3"]);
        assert_eq!(lib.effective_ttl(), Duration::from_secs(600));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        config.apply_overrides(lookup_from(&[
            ("TUNESTREAM_SERVER_HOST", "127.0.0.1"),
            ("TUNESTREAM_SERVER_PORT", "9090"),
            ("TUNESTREAM_MAX_RANGE_SIZE", "1048576"),
            ("TUNESTREAM_MUSIC_DIRECTORY", "/data/music"),
            ("TUNESTREAM_CACHE_TTL_MINUTES", "15"),
            ("TUNESTREAM_LOG_FILE", "/var/log/tunestream.log"),
        ]));

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.max_range_size, 1048576);
        assert_eq!(config.music.directory, PathBuf::from("/data/music"));
        assert_eq!(config.music.cache_ttl_minutes, 15);
        assert_eq!(
            config.logging.file,
            Some(PathBuf::from("/var/log/tunestream.log"))
        );
    }

    #[test]
    fn test_invalid_env_overrides_ignored() {
        let mut config = ServerConfig::default();
        let rejected = config.apply_overrides(lookup_from(&[
            ("TUNESTREAM_SERVER_PORT", "not-a-port"),
            ("TUNESTREAM_MAX_RANGE_SIZE", "-5"),
            ("TUNESTREAM_CACHE_TTL_MINUTES", ""),
            ("TUNESTREAM_LOG_FILE", ""),
        ]));

        assert_eq!(rejected.len(), 3);
        assert!(rejected[0].contains("TUNESTREAM_SERVER_PORT"));
        assert!(config.logging.file.is_none());

        assert_eq!(config.port, 8080);
        assert_eq!(config.max_range_size, DEFAULT_MAX_RANGE_SIZE);
        assert_eq!(config.music.cache_ttl_minutes, DEFAULT_CACHE_TTL_MINUTES);
    }

    #[test]
    fn test_validation() {
        let bad = [
            ServerConfig {
                port: 0,
                ..Default::default()
            },
            ServerConfig {
                max_range_size: 0,
                ..Default::default()
            },
            ServerConfig {
                max_range_size: MAX_RANGE_SIZE_LIMIT + 1,
                ..Default::default()
            },
            ServerConfig {
                host: String::new(),
                ..Default::default()
            },
            ServerConfig {
                music: MusicConfig {
                    cache_ttl_minutes: 1441,
                    ..Default::default()
                },
                ..Default::default()
            },
            ServerConfig {
                logging: LoggingConfig {
                    level: "verbose".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
        ];

        for config in bad {
            assert!(
                matches!(config.validate(), Err(ServerError::Config(_))),
                "{:?}",
                config
            );
        }

        let edge = ServerConfig {
            max_range_size: MAX_RANGE_SIZE_LIMIT,
            music: MusicConfig {
                cache_ttl_minutes: MAX_CACHE_TTL_MINUTES,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_resolve_paths() {
        let mut config = ServerConfig::default();
        config.music.directory = PathBuf::from("music");
        config.resolve_paths();
        assert!(config.music.directory.is_absolute());
        assert!(config.music.directory.ends_with("music"));
    }
}
