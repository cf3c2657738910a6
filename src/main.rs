//! Partwise Forge server
//!
//! Serves the front-end shell page and relays chat prompts to Groq.

use anyhow::{Context, Result};
use clap::Parser;
use partwise_forge::{
    config::{Environment, Settings},
    logging::RotatingLogFile,
    server::App,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Partwise Forge server
#[derive(Parser, Debug)]
#[command(name = "partwise-forge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides PORT env var)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides HOST env var)
    #[arg(long)]
    host: Option<String>,

    /// Log level: trace, debug, info, warn, error (overrides LOG_LEVEL env var)
    #[arg(long)]
    log_level: Option<String>,

    /// Environment: dev, staging, prod (overrides ENVIRONMENT env var)
    #[arg(short, long)]
    env: Option<Environment>,

    /// Serve assets from the front-end dev server instead of the build manifest
    #[arg(long)]
    debug: bool,

    /// Log file path for JSON logs (enables file logging with 10MB rotation)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (before logging, so we can use log_level)
    let mut settings = Settings::load()?;

    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }
    if let Some(env) = args.env {
        settings.environment = env;
    }
    if args.debug {
        settings.debug = true;
    }

    init_tracing(&settings.log_level, args.log_file.as_ref())?;

    tracing::info!(
        app_name = %settings.app_name,
        version = %settings.app_version,
        environment = %settings.environment,
        debug = settings.debug,
        host = %settings.host,
        port = %settings.port,
        "Starting application"
    );

    let app = App::new(settings).await?;
    app.run_with_graceful_shutdown().await?;

    tracing::info!("Application shutdown complete");

    Ok(())
}

/// JSON logs to stdout, plus a rotating file when `--log-file` is given
fn init_tracing(log_level: &str, log_file: Option<&PathBuf>) -> Result<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let console_layer = fmt::layer().json().with_filter(filter());
    let subscriber = tracing_subscriber::registry().with(console_layer);

    match log_file {
        Some(path) => {
            let writer = RotatingLogFile::with_defaults(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let file_layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());

            subscriber.with(file_layer).init();
            tracing::info!(path = %path.display(), "File logging enabled");
        }
        None => subscriber.init(),
    }

    Ok(())
}
