//! Fetch command - run the stream phase without the HTTP server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::info;
use vidrelay_core::detect_source;
use vidrelay_server::forward::response_headers;
use vidrelay_server::{ApiError, ProxyQuery, ProxyState, open_stream};

use crate::output::{JsonFormatter, StreamHead, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the fetch command.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Link to stream.
    pub input: String,

    /// Range header sent upstream (defaults to `bytes=0-`).
    #[arg(long, short)]
    pub range: Option<String>,

    /// Write the body to this file.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Provider wire name, skipping detection.
    #[arg(long, short)]
    pub provider: Option<String>,

    /// Backend URL for providers without a built-in resolver.
    #[arg(long)]
    pub backend: Option<String>,
}

/// Runs the fetch command.
pub async fn run(args: &FetchArgs, cli: &Cli) -> Result<()> {
    let mut config = cli.load_config()?;
    if let Some(backend) = &args.backend {
        config.backend_url = Some(backend.clone());
    }
    let state = ProxyState::from_config(&config)?;

    let reference = detect_source(&args.input);
    let provider = args
        .provider
        .clone()
        .unwrap_or_else(|| reference.provider.as_str().to_string());
    let query = ProxyQuery {
        stream: Some("1".to_string()),
        provider: Some(provider),
        identifier: Some(reference.identifier.clone()),
        source: Some(reference.original.clone()),
    };

    let stream = open_stream(&state, &query, args.range.as_deref()).await?;
    if stream.is_html() {
        return Err(ApiError::bad_gateway("Source cannot be streamed as video").into());
    }

    let headers = response_headers(&stream.headers)
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("<binary>").to_string(),
            )
        })
        .collect();
    let head = StreamHead::new(stream.status.as_u16(), headers);
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_stream_head(&head));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&head)?);
        }
    }

    let Some(path) = &args.output else {
        return Ok(());
    };

    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("creating {}", path.display()))?;
    let mut body = stream.body;
    let mut written: u64 = 0;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    info!(bytes = written, path = %path.display(), "Body written");
    if !cli.quiet {
        eprintln!("Wrote {written} bytes to {}", path.display());
    }
    Ok(())
}
