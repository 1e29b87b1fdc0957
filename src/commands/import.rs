//! Import command implementation
//!
//! Loads the document first, so a malformed file never reaches the store,
//! then hands it to the reconciliation controller. A declined prompt is not
//! an error: it prints `Import cancelled` and exits with status 1.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use keyport::confirm;
use keyport::defaults::DEFAULT_FORMAT;
use keyport::exit_codes;
use keyport::format::{self, Format};
use keyport::import::{import, ImportOptions, ImportOutcome};
use keyport::output;
use keyport::suggestions;

use super::parse_format;
use crate::cli::Context;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Store directory to import into (e.g. /app/config)
    #[arg(value_name = "DIR")]
    pub dir: String,

    /// Document to import
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Merge into an existing directory without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Delete the directory's contents before importing (always asks)
    #[arg(short, long)]
    pub replace: bool,

    /// Format of FILE: json, yaml or toml
    #[arg(
        short,
        long,
        value_name = "FORMAT",
        env = "KEYPORT_FORMAT",
        default_value = DEFAULT_FORMAT,
        value_parser = parse_format
    )]
    pub format: Format,
}

/// Execute the import command
pub fn execute(args: ImportArgs, context: &Context) -> Result<ExitCode> {
    let document = format::load(&args.file, args.format).map_err(suggestions::explain)?;
    let store = context.store()?;

    let options = ImportOptions {
        replace: args.replace,
        assume_yes: args.yes,
    };
    let mut gate = confirm::stdio();

    match import(&store, &mut gate, &args.dir, &document, options).map_err(suggestions::explain)? {
        ImportOutcome::Completed(report) => {
            println!("{}", output::import_summary(&context.output, &report));
            Ok(ExitCode::SUCCESS)
        }
        ImportOutcome::Declined => {
            println!("{}", output::import_cancelled(&context.output));
            Ok(exit_codes::failure())
        }
    }
}
