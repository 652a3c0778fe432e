// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! vidrelay CLI - video source resolution and streaming proxy.
//!
//! # Examples
//!
//! ```bash
//! # Run the proxy on the configured address
//! vidrelay serve
//!
//! # Run with a backend for providers without a built-in resolver
//! vidrelay serve --bind 0.0.0.0:8080 --backend https://resolver.internal/resolve
//!
//! # Classify a link
//! vidrelay detect "https://drive.google.com/file/d/1AbC.../view"
//!
//! # Resolve to a playback URL
//! vidrelay resolve "https://vidmoly.me/w/abc123"
//!
//! # Stream the first megabyte to a file
//! vidrelay fetch "https://drive.google.com/file/d/1AbC.../view" --range bytes=0-1048575 -o head.mp4
//!
//! # List providers
//! vidrelay providers --format json
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vidrelay_server::{ApiError, ServerConfig};

use commands::{detect, fetch, providers, resolve, serve};

// ============================================================================
// CLI Definition
// ============================================================================

/// vidrelay CLI - video source resolution and streaming proxy.
#[derive(Parser)]
#[command(name = "vidrelay")]
#[command(about = "Video source resolution and range-preserving streaming proxy")]
#[command(long_about = r#"
vidrelay turns links to third-party video hosts into range-capable streams.

Supported providers:
  • Google Drive (google-drive)   built-in cascade resolver
  • Vidmoly (vidmoly)             built-in page + lookup resolver
  • Direct files (direct)         passthrough
  • HLS playlists (hls)           passthrough
  • VOE, Streamtape, DoodStream   via the proxy backend

Examples:
  vidrelay serve                     # Run the HTTP proxy
  vidrelay detect <link>             # Classify a link
  vidrelay resolve <link>            # Print the playback URL
  vidrelay fetch <link> -o out.mp4   # Stream through the resolver
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Config file (defaults to the user config dir).
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP proxy.
    Serve(serve::ServeArgs),

    /// Classify a link by provider.
    #[command(visible_alias = "d")]
    Detect(detect::DetectArgs),

    /// Resolve a link to a playback URL.
    #[command(visible_alias = "r")]
    Resolve(resolve::ResolveArgs),

    /// Run the stream phase locally.
    Fetch(fetch::FetchArgs),

    /// List providers and how they are resolved.
    #[command(visible_alias = "p")]
    Providers,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// The input could not be resolved (4xx).
    InvalidInput = 2,
    /// An upstream or the backend failed (5xx).
    Upstream = 3,
}

impl ExitCode {
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ApiError>() {
            Some(api) if api.status.is_client_error() => Self::InvalidInput,
            Some(_) => Self::Upstream,
            None => Self::Error,
        }
    }
}

impl Cli {
    /// Loads the server configuration, applying file then environment.
    pub fn load_config(&self) -> Result<ServerConfig> {
        let config = match &self.config {
            Some(path) => ServerConfig::load_from(path)?,
            None => ServerConfig::load()?,
        };
        Ok(config.with_env()?)
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("vidrelay=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vidrelay=info,warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Serve(args) => serve::run(args, &cli).await,
        Commands::Detect(args) => detect::run(args, &cli),
        Commands::Resolve(args) => resolve::run(args, &cli).await,
        Commands::Fetch(args) => fetch::run(args, &cli).await,
        Commands::Providers => providers::run(&cli),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
            if let Some(details) = e.downcast_ref::<ApiError>().and_then(|a| a.details.as_deref()) {
                eprintln!("{details}");
            }
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}
