//! tunestream server
//!
//! Serves a directory of audio files over HTTP: a JSON catalogue backed by
//! a cached library index, and byte-range streaming of individual songs.

mod config;
mod config_file;
mod error;
mod http;
mod state;

use std::fs::{File, OpenOptions};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use tunestream_lib::CancellationToken;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Result, ServerError};
use crate::http::create_router;
use crate::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "tunestream-server";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let (mut config, load_warning) = config_file::load_or_default(&config_path);
    let rejected = config.apply_env_overrides();

    // Flushes the log file on drop; must live until main returns
    let _log_guard = init_logging(&config.logging);
    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    for warning in load_warning.into_iter().chain(rejected) {
        tracing::warn!("{}", warning);
    }

    config.resolve_paths();
    config.validate()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let state = Arc::new(AppState::new(config.clone()));

    // Warm the index so the first request is a cache hit
    let library = Arc::clone(&state.library);
    match tokio::task::spawn_blocking(move || library.scan(&CancellationToken::new())).await {
        Ok(Ok(entries)) => tracing::info!(
            "Indexed {} songs in {:?}",
            entries.len(),
            config.music.directory
        ),
        Ok(Err(e)) => tracing::warn!("Initial library scan failed: {}", e),
        Err(e) => tracing::warn!("Initial library scan task failed: {}", e),
    }

    let app = create_router(state);

    let addr: SocketAddr = config
        .socket_addr()
        .parse()
        .map_err(|e| ServerError::Config(format!("invalid listen address: {}", e)))?;
    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize logging with tracing. `RUST_LOG` takes precedence over the
/// configured level.
///
/// Logs go to stdout and, when `logging.file` is set, are appended to that
/// file through a background writer. The returned guard flushes it. A file
/// that cannot be opened is reported and logging continues on stdout.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let level = logging.level.to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tunestream_server={level},tunestream_lib={level},tower_http={level}"
        ))
    });

    let mut layers = vec![fmt_layer(logging.format, std::io::stdout, true)];

    let mut guard = None;
    let mut file_error = None;
    if let Some(path) = &logging.file {
        match open_log_file(path) {
            Ok(file) => {
                let (writer, worker) = tracing_appender::non_blocking(file);
                layers.push(fmt_layer(logging.format, writer, false));
                guard = Some(worker);
            }
            Err(e) => file_error = Some((path, e)),
        }
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .init();

    if let Some((path, e)) = file_error {
        tracing::warn!(
            "Cannot open log file {:?}: {}. Logging to stdout only.",
            path,
            e
        );
    }
    guard
}

fn fmt_layer<S, W>(format: LogFormat, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi);
    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.boxed(),
    }
}

/// Open `path` for appending, creating it if needed
fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
