//! Providers command - list providers and how they resolve.

use anyhow::Result;
use tracing::debug;
use vidrelay_providers::{ProviderRegistry, ResolveMode};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the providers command.
pub fn run(cli: &Cli) -> Result<()> {
    debug!("Listing providers");

    let providers = ProviderRegistry::all();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_providers_header());
            println!("{}", "─".repeat(70));

            for desc in providers {
                println!("{}", formatter.format_provider_line(desc));
            }

            println!();
            println!(
                "Total: {} providers ({} built-in, {} via backend)",
                providers.len(),
                ProviderRegistry::with_mode(ResolveMode::BuiltIn).len(),
                ProviderRegistry::with_mode(ResolveMode::Backend).len()
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_providers(providers)?);
        }
    }

    Ok(())
}
