//! Detect command - classify a link.

use anyhow::Result;
use clap::Args;
use vidrelay_core::detect_source;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the detect command.
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Link, or text embedding one (such as an iframe snippet).
    pub input: String,
}

/// Runs the detect command.
pub fn run(args: &DetectArgs, cli: &Cli) -> Result<()> {
    let reference = detect_source(&args.input);

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_source(&reference));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&reference)?);
        }
    }
    Ok(())
}
