//! Process exit codes
//!
//! - `0`: the command did what was asked.
//! - `1`: an error occurred, or the operator declined a confirmation.
//! - `2`: the command line was invalid (reported by `clap`).

use std::process::ExitCode;

pub const SUCCESS: u8 = 0;
pub const ERROR: u8 = 1;
pub const USAGE: u8 = 2;

/// Exit code for a command that failed or was cancelled.
pub fn failure() -> ExitCode {
    ExitCode::from(ERROR)
}
