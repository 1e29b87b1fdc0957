//! Export command implementation
//!
//! Reads a store directory recursively and renders it as a document, on
//! stdout or into a file.

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use keyport::defaults::DEFAULT_FORMAT;
use keyport::export::export;
use keyport::format::{self, Format};
use keyport::output;
use keyport::suggestions;

use super::parse_format;
use crate::cli::Context;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Store directory to export
    #[arg(value_name = "DIR")]
    pub dir: String,

    /// Output format: json, yaml or toml
    #[arg(
        short,
        long,
        value_name = "FORMAT",
        env = "KEYPORT_FORMAT",
        default_value = DEFAULT_FORMAT,
        value_parser = parse_format
    )]
    pub format: Format,

    /// Write to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the export command
pub fn execute(args: ExportArgs, context: &Context) -> Result<ExitCode> {
    let store = context.store()?;
    let document = export(&store, &args.dir).map_err(suggestions::explain)?;
    let rendered = format::render(&document, args.format).map_err(suggestions::explain)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{}", output::export_written(&context.output, &args.dir, &path));
        }
        None => print!("{}", rendered),
    }
    Ok(ExitCode::SUCCESS)
}
