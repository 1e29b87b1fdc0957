//! # CLI Command Implementations
//!
//! One module per `keyport` subcommand. Each module contains:
//! - an `Args` struct derived with `clap`,
//! - an `execute` function that runs the command against the `keyport`
//!   library and returns the process exit code.

pub mod completions;
pub mod export;
pub mod import;
pub mod tree;

use keyport::format::Format;
use keyport::suggestions;

/// `clap` value parser for `--format`, so unknown formats are usage errors.
pub fn parse_format(value: &str) -> Result<Format, String> {
    value
        .parse::<Format>()
        .map_err(|_| suggestions::unsupported_format(value))
}
