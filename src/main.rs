//! # keyport CLI
//!
//! Binary entry point for the `keyport` command-line tool.
//!
//! Parses arguments with `clap`, runs the selected command and turns its
//! result into a process exit code. The import, export and store logic
//! lives in the `keyport` library crate; the binary is a thin wrapper.

mod cli;
mod commands;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    cli.execute()
}
