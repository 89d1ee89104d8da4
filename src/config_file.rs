//! Configuration file support
//!
//! Loads server configuration from TOML files. Every section and key is
//! optional; anything missing keeps its default.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::config::{LogFormat, ServerConfig};
use crate::error::{Result, ServerError};

/// Configuration file format
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub server: Option<ServerSettings>,
    pub music: Option<MusicSettings>,
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Bytes
    pub max_range_size: Option<u64>,
    pub cors_enabled: Option<bool>,
    pub expose_error_details: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MusicSettings {
    pub directory: Option<PathBuf>,
    pub supported_formats: Option<Vec<String>>,
    pub cache_ttl_minutes: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
    /// Output format (json, pretty)
    pub format: Option<LogFormat>,
    /// Append logs to this file as well as stdout
    pub file: Option<PathBuf>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Overlay the file onto the defaults
    pub fn into_server_config(self) -> ServerConfig {
        let mut config = ServerConfig::default();

        if let Some(server) = self.server {
            if let Some(host) = server.host {
                config.host = host;
            }
            if let Some(port) = server.port {
                config.port = port;
            }
            if let Some(size) = server.max_range_size {
                config.max_range_size = size;
            }
            if let Some(cors) = server.cors_enabled {
                config.cors_enabled = cors;
            }
            if let Some(expose) = server.expose_error_details {
                config.expose_error_details = expose;
            }
        }

        if let Some(music) = self.music {
            if let Some(dir) = music.directory {
                config.music.directory = dir;
            }
            if let Some(formats) = music.supported_formats {
                config.music.supported_formats = formats;
            }
            if let Some(ttl) = music.cache_ttl_minutes {
                config.music.cache_ttl_minutes = ttl;
            }
        }

        if let Some(logging) = self.logging {
            if let Some(level) = logging.level {
                config.logging.level = level;
            }
            if let Some(format) = logging.format {
                config.logging.format = format;
            }
            if logging.file.is_some() {
                config.logging.file = logging.file;
            }
        }

        config
    }
}

/// Load `path` if it exists. A missing or unreadable file yields the
/// defaults plus a message to log once logging is up.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> (ServerConfig, Option<String>) {
    let path = path.as_ref();
    if !path.exists() {
        return (
            ServerConfig::default(),
            Some(format!("Config file {:?} not found. Using defaults.", path)),
        );
    }

    match ConfigFile::from_file(path) {
        Ok(cf) => (cf.into_server_config(), None),
        Err(e) => (
            ServerConfig::default(),
            Some(format!(
                "Failed to load config file {:?}: {}. Using defaults.",
                path, e
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL: &str = r#"
[server]
host = "127.0.0.1"
port = 9000
max_range_size = 1048576
cors_enabled = false
expose_error_details = true

[music]
directory = "/srv/music"
supported_formats = [".mp3", ".flac"]
cache_ttl_minutes = 10

[logging]
level = "debug"
format = "json"
file = "/var/log/tunestream/server.log"
"#;

    #[test]
    fn test_full_file() {
        let config = ConfigFile::parse(FULL).unwrap().into_server_config();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_range_size, 1048576);
        assert!(!config.cors_enabled);
        assert!(config.expose_error_details);
        assert_eq!(config.music.directory, PathBuf::from("/srv/music"));
        assert_eq!(config.music.supported_formats, vec![".mp3", ".flac"]);
        assert_eq!(config.music.cache_ttl_minutes, 10);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.logging.file,
            Some(PathBuf::from("/var/log/tunestream/server.log"))
        );
    }

    #[test]
    fn test_log_file_is_optional() {
        let config = ConfigFile::parse("[logging]\nlevel = \"warn\"\n")
            .unwrap()
            .into_server_config();
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.file.is_none());

        assert!(matches!(
            ConfigFile::parse("[logging]\nfile = 42\n"),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ConfigFile::parse("[server]\nport = 7000\n")
            .unwrap()
            .into_server_config();
        let defaults = ServerConfig::default();
        assert_eq!(config.port, 7000);
        assert_eq!(config.host, defaults.host);
        assert_eq!(config.max_range_size, defaults.max_range_size);
        assert_eq!(config.music.supported_formats, defaults.music.supported_formats);
    }

    #[test]
    fn test_invalid_file() {
        assert!(matches!(
            ConfigFile::parse("[server]\nport = \"eighty\"\n"),
            Err(ServerError::Config(_))
        ));
        assert!(matches!(
            ConfigFile::parse("[logging]\nformat = \"xml\"\n"),
            Err(ServerError::Config(_))
        ));
        assert!(matches!(
            ConfigFile::parse("[segment]\ntarget = 4\n"),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn test_load_or_default() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(FULL.as_bytes()).unwrap();

        let (config, warning) = load_or_default(temp_file.path());
        assert!(warning.is_none());
        assert_eq!(config.port, 9000);

        let (config, warning) = load_or_default("/nonexistent/tunestream.toml");
        assert!(warning.is_some());
        assert_eq!(config.port, ServerConfig::default().port);

        let mut broken = NamedTempFile::new().unwrap();
        broken.write_all(b"[server\n").unwrap();
        let (config, warning) = load_or_default(broken.path());
        assert!(warning.unwrap().contains("Using defaults"));
        assert_eq!(config.port, ServerConfig::default().port);
    }
}
