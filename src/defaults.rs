//! Default values for keyport configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;
use std::time::Duration;

/// Name of the settings file looked up in the user's config directory.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Peers contacted when neither the settings file nor the CLI names any.
pub const DEFAULT_PEERS: [&str; 2] = ["http://127.0.0.1:4001", "http://127.0.0.1:2379"];

/// Bound on establishing a connection to a peer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Bound on a single store request, from send to full response.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Format used for import and export when none is given.
pub const DEFAULT_FORMAT: &str = "json";

/// Returns the default settings file path.
///
/// Uses the platform-appropriate configuration directory:
/// - Linux: `~/.config/keyport/config.toml` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/keyport/config.toml`
/// - Windows: `{FOLDERID_RoamingAppData}\keyport\config.toml`
///
/// Returns `None` when the platform directory cannot be determined. The
/// file is optional; it is only read when it exists. This can be overridden
/// by the `--config` CLI flag or the `KEYPORT_CONFIG` environment variable.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("keyport").join(CONFIG_FILENAME))
}
