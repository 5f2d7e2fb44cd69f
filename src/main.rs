//! heifbox entry point.
//!
//! Startup order:
//! 1. Resolve configuration: file, then environment, then CLI flags.
//! 2. Initialise structured tracing.
//! 3. Build shared state with the libheif decoder.
//! 4. Start the session sweeper in a background task.
//! 5. Build the Axum router and serve with graceful shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info, warn};

use heifbox::config::Config;
use heifbox::imaging::LibheifDecoder;
use heifbox::routes;
use heifbox::state::AppState;

#[derive(Parser)]
#[command(name = "heifbox")]
#[command(about = "Web service that converts HEIC/HEIF photos to PNG or JPEG")]
#[command(long_about = "\
Web service that converts HEIC/HEIF photos to PNG or JPEG

Serves a single-page converter UI and a small HTTP API:

  GET  /               Converter page
  POST /convert        Multipart upload: repeated `files` parts plus one
                       `format` field (png | jpeg). One submitted file comes
                       back as the converted image, several as a ZIP archive.
  GET  /history        This session's conversion records
  POST /clear-history  Forget this session's records

Configuration is resolved in order, last wins:

  config.toml          via --config; every key is optional
  PORT                 listen port (default 8080)
  --port, --log        flags below

RUST_LOG overrides the configured log filter entirely.

Decoding uses the system libheif library; install it through your package
manager (e.g. `apt install libheif-dev`, `brew install libheif`).")]
#[command(version)]
struct Cli {
    /// Path to a config.toml (all keys optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen port, overriding config file and PORT
    #[arg(long)]
    port: Option<u16>,

    /// Log filter, e.g. "debug" or "heifbox=debug,tower_http=warn"
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(log) = cli.log {
        config.server.log = log;
    }
    config.validate()?;

    init_tracing(&config);
    info!(version = env!("CARGO_PKG_VERSION"), "heifbox starting");

    let state = AppState::new(config, LibheifDecoder);

    // Sweep idle sessions for the whole run.
    let sweeper = Arc::clone(&state);
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(sweeper.config.sweep_interval());
        loop {
            tick.tick().await;
            let dropped = sweeper.sessions.sweep();
            if dropped > 0 {
                debug!(dropped, "swept expired sessions");
            }
        }
    });

    let app = routes::build(Arc::clone(&state));
    let addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("heifbox stopped");
    Ok(())
}

/// Build the log-level filter, warning loudly if the configured value is
/// not a valid tracing filter expression.
fn init_tracing(config: &Config) {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match config.server.log.parse::<tracing_subscriber::EnvFilter>() {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!(
                    "WARN: log filter '{}' is not valid ({e}); falling back to 'info'",
                    config.server.log
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
