//! Serve command - run the HTTP proxy.

use std::net::SocketAddr;

use anyhow::Result;
use clap::Args;
use tracing::info;
use vidrelay_server::run_server;

use crate::Cli;

/// Arguments for the serve command.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen address (overrides config and `VIDRELAY_BIND`).
    #[arg(long, short)]
    pub bind: Option<SocketAddr>,

    /// External proxy backend URL (overrides `PROXY_SERVICE_URL`).
    #[arg(long)]
    pub backend: Option<String>,

    /// Files API key (overrides `GOOGLE_API_KEY`).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Mount path of the proxy endpoint.
    #[arg(long)]
    pub mount_path: Option<String>,
}

/// Runs the serve command until Ctrl+C.
pub async fn run(args: &ServeArgs, cli: &Cli) -> Result<()> {
    let mut config = cli.load_config()?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(backend) = &args.backend {
        config.backend_url = Some(backend.clone());
    }
    if let Some(key) = &args.api_key {
        config.drive_api_key = Some(key.clone());
    }
    if let Some(mount) = &args.mount_path {
        config.mount_path = mount.clone();
    }

    run_server(&config, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown requested");
    })
    .await?;

    Ok(())
}
