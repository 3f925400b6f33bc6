//! DTMicroscope MCP Server - digital-twin microscope exposed as MCP tools.
//!
//! This binary speaks line-delimited JSON-RPC 2.0 on stdin/stdout and wraps
//! the dtmicroscope-core library for AI-agent clients.

mod handlers;
mod server;
mod tools;
mod transport;
mod wrapper;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use dtmicroscope_core::config::{AppConfig, ServerConfig};
use dtmicroscope_core::{InstrumentKind, MicroscopeApi};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "dtmicroscope-mcp")]
#[command(about = "MCP stdio server for the DTMicroscope digital twin")]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log output format (logs always go to stderr)
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Data source used when initialize_microscope omits data_path
    #[arg(long)]
    default_data_path: Option<String>,

    /// Largest accepted request line in bytes
    #[arg(long, default_value_t = ServerConfig::MAX_LINE_BYTES)]
    max_line_bytes: usize,

    /// Initialize an AFM session before serving
    #[arg(long)]
    preload: bool,
}

fn init_logging(args: &Args) {
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match args.log_format {
        LogFormat::Text => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    info!(
        "Starting {} MCP server ({})",
        AppConfig::APP_NAME,
        AppConfig::SERVER_NAME
    );

    let mut builder = MicroscopeApi::builder();
    if let Some(source) = &args.default_data_path {
        builder = builder.default_data_source(source.clone());
    }
    let api = builder.build();
    info!("Default data source: {}", api.default_data_source());

    if args.preload {
        let response = api.initialize(InstrumentKind::Afm, None).await?;
        info!("{}", response.message);
    }

    let state = server::AppState::new(api);
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();

    server::serve(&state, reader, writer, args.max_line_bytes).await?;

    info!("Shutting down");
    Ok(())
}
