//! Application state shared across all handlers

use std::sync::Arc;
use tunestream_lib::{Library, MusicLibrary, StreamEngine};

use crate::config::ServerConfig;

pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,

    /// Library index
    pub library: Arc<dyn Library>,

    /// Byte-range streaming over `library`
    pub engine: StreamEngine,
}

impl AppState {
    /// Create state backed by a directory-walking library
    pub fn new(config: ServerConfig) -> Self {
        let library: Arc<dyn Library> =
            Arc::new(MusicLibrary::new(config.music.library_config()));
        Self::with_library(config, library)
    }

    /// Create state around an existing library
    pub fn with_library(config: ServerConfig, library: Arc<dyn Library>) -> Self {
        let engine = StreamEngine::new(
            Arc::clone(&library),
            library.root(),
            config.max_range_size,
        );
        Self {
            config,
            library,
            engine,
        }
    }

    pub fn expose_error_details(&self) -> bool {
        self.config.expose_error_details
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunestream_lib::CancellationToken;

    #[test]
    fn test_app_state_creation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"x").unwrap();

        let mut config = ServerConfig::default();
        config.music.directory = dir.path().to_path_buf();
        config.max_range_size = 4096;

        let state = AppState::new(config);
        assert_eq!(state.library.root(), dir.path());
        assert_eq!(state.engine.root(), dir.path());
        assert_eq!(state.engine.max_range_size(), 4096);
        assert_eq!(state.library.count(), 0);

        state.library.scan(&CancellationToken::new()).unwrap();
        assert_eq!(state.library.count(), 1);
    }
}
