//! Resolve command - run the resolve phase.

use anyhow::Result;
use clap::Args;
use vidrelay_server::{PlaybackResponse, ProxyState, ResolveRequest, resolve_playback};

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the resolve command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Link to resolve.
    pub source: String,

    /// Provider wire name, skipping detection.
    #[arg(long, short)]
    pub provider: Option<String>,

    /// Provider identifier, skipping detection.
    #[arg(long, short)]
    pub identifier: Option<String>,

    /// Backend URL for providers without a built-in resolver.
    #[arg(long)]
    pub backend: Option<String>,
}

/// Runs the resolve command.
pub async fn run(args: &ResolveArgs, cli: &Cli) -> Result<()> {
    let mut config = cli.load_config()?;
    if let Some(backend) = &args.backend {
        config.backend_url = Some(backend.clone());
    }
    let state = ProxyState::from_config(&config)?;

    let request = ResolveRequest {
        provider: args.provider.clone(),
        source: Some(args.source.clone()),
        identifier: args.identifier.clone(),
    };
    let playback_url = resolve_playback(&state, request).await?;

    match cli.format {
        OutputFormat::Text => {
            // Stream URLs are relative to the proxy itself.
            if playback_url.starts_with('/') {
                println!("http://{}{playback_url}", config.bind);
            } else {
                println!("{playback_url}");
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&PlaybackResponse { playback_url })?);
        }
    }
    Ok(())
}
