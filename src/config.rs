//! # Settings
//!
//! This module defines how keyport finds the store it talks to and how long
//! it is willing to wait for it. Settings come from three layers, lowest
//! precedence first:
//!
//! 1.  **Built-in defaults** (see [`crate::defaults`]).
//! 2.  **Settings file**: a TOML file named by `--config`/`KEYPORT_CONFIG`,
//!     or `<config dir>/keyport/config.toml` when that exists.
//! 3.  **Overrides**: CLI flags and their environment variables.
//!
//! The result is a [`Settings`] value that is built once per invocation and
//! handed to the store client explicitly; there is no process-wide client.
//!
//! ## File Format
//!
//! ```toml
//! peers = ["http://10.0.0.1:2379", "http://10.0.0.2:2379"]
//! timeout = "1s"
//! command-timeout = "5s"
//! user = "root:secret"
//! ca = "/etc/ssl/etcd-ca.pem"
//! cert = "/etc/ssl/client.pem"
//! key = "/etc/ssl/client-key.pem"
//! ```

use crate::defaults;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// The settings file as written on disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SettingsFile {
    /// Store endpoints, tried in order.
    #[serde(default)]
    pub peers: Option<Vec<String>>,
    /// Connection timeout, e.g. `"1s"`.
    #[serde(default)]
    pub timeout: Option<String>,
    /// Per-request timeout, e.g. `"5s"`.
    #[serde(default)]
    pub command_timeout: Option<String>,
    /// `name` or `name:password`.
    #[serde(default)]
    pub user: Option<String>,
    /// Client certificate (PEM).
    #[serde(default)]
    pub cert: Option<PathBuf>,
    /// Client private key (PEM).
    #[serde(default)]
    pub key: Option<PathBuf>,
    /// Additional CA certificate (PEM).
    #[serde(default)]
    pub ca: Option<PathBuf>,
}

/// Values supplied on the command line (or through their environment
/// variables). `None` means "not given", so the file or default applies.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Comma-separated peer list.
    pub peers: Option<String>,
    pub timeout: Option<String>,
    pub command_timeout: Option<String>,
    pub user: Option<String>,
}

/// Basic-auth credentials for the store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    /// Missing when only a user name was configured.
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    /// Parse `name` or `name:password`.
    pub fn parse(user: &str) -> Self {
        match user.split_once(':') {
            Some((name, password)) => Self {
                username: name.to_string(),
                password: Some(password.to_string()),
            },
            None => Self {
                username: user.to_string(),
                password: None,
            },
        }
    }
}

/// TLS material for talking to `https` peers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub ca: Option<PathBuf>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Store endpoints, tried in order until one accepts a connection.
    pub peers: Vec<Url>,
    /// Bound on establishing a connection.
    pub timeout: Duration,
    /// Bound on a whole request.
    pub command_timeout: Duration,
    pub credentials: Option<Credentials>,
    pub tls: TlsFiles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            peers: defaults::DEFAULT_PEERS
                .iter()
                .filter_map(|p| Url::parse(p).ok())
                .collect(),
            timeout: defaults::DEFAULT_TIMEOUT,
            command_timeout: defaults::DEFAULT_COMMAND_TIMEOUT,
            credentials: None,
            tls: TlsFiles::default(),
        }
    }
}

impl Settings {
    /// Resolve settings from an optional explicit file, the default file
    /// location and the command-line overrides.
    ///
    /// An explicitly named file must exist; the default location is only
    /// read when present.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = match config_path {
            Some(path) => Some(from_file(path)?),
            None => match defaults::default_config_path() {
                Some(path) if path.is_file() => Some(from_file(&path)?),
                _ => None,
            },
        };
        Self::resolve(file.unwrap_or_default(), overrides)
    }

    /// Merge a parsed settings file with overrides on top of the defaults.
    pub fn resolve(file: SettingsFile, overrides: &Overrides) -> Result<Self> {
        let mut settings = Settings::default();

        let peers: Option<Vec<String>> = match &overrides.peers {
            Some(list) => Some(
                list.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            None => file.peers,
        };
        if let Some(peers) = peers {
            settings.peers = parse_peers(&peers)?;
        }

        if let Some(timeout) = overrides.timeout.as_deref().or(file.timeout.as_deref()) {
            settings.timeout = parse_duration(timeout)?;
        }
        if let Some(timeout) = overrides
            .command_timeout
            .as_deref()
            .or(file.command_timeout.as_deref())
        {
            settings.command_timeout = parse_duration(timeout)?;
        }
        if let Some(user) = overrides.user.as_deref().or(file.user.as_deref()) {
            settings.credentials = Some(Credentials::parse(user));
        }

        settings.tls = TlsFiles {
            cert: file.cert,
            key: file.key,
            ca: file.ca,
        };
        if settings.tls.cert.is_some() != settings.tls.key.is_some() {
            return Err(Error::ConfigParse {
                message: "cert and key must be given together".to_string(),
                hint: Some("Set both 'cert' and 'key' in the settings file".to_string()),
            });
        }

        Ok(settings)
    }
}

/// Parse a settings file from disk.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SettingsFile> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        message: format!("cannot read {}: {}", path.display(), e),
        hint: Some("Check --config / KEYPORT_CONFIG".to_string()),
    })?;
    parse(&content)
}

/// Parse settings file content.
pub fn parse(content: &str) -> Result<SettingsFile> {
    toml::from_str(content).map_err(|e| Error::ConfigParse {
        message: e.message().to_string(),
        hint: None,
    })
}

fn parse_peers(peers: &[String]) -> Result<Vec<Url>> {
    if peers.is_empty() {
        return Err(Error::ConfigParse {
            message: "no peers configured".to_string(),
            hint: Some("Pass --peers http://127.0.0.1:2379".to_string()),
        });
    }
    peers
        .iter()
        .map(|peer| {
            let url = Url::parse(peer)?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(Error::ConfigParse {
                    message: format!("peer '{}' is not an http(s) URL", peer),
                    hint: Some("Peers look like http://host:2379".to_string()),
                });
            }
            Ok(url)
        })
        .collect()
}

/// Parse a duration string into a Duration
///
/// Format: number followed by unit (ms, s, m, h)
/// Examples: "500ms", "1s", "1.5s", "2m"
pub fn parse_duration(duration_str: &str) -> Result<Duration> {
    let invalid = |message: String| Error::ConfigParse {
        message,
        hint: Some("Durations look like 500ms, 1s, 2m or 1h".to_string()),
    };
    let duration_str = duration_str.trim().to_lowercase();

    if duration_str.is_empty() {
        return Err(invalid("duration cannot be empty".to_string()));
    }

    // Find the split point between number and unit
    let split_idx = duration_str
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit() && *c != '.')
        .map(|(i, _)| i)
        .unwrap_or(duration_str.len());

    if split_idx == 0 {
        return Err(invalid(format!(
            "duration must start with a number: '{}'",
            duration_str
        )));
    }

    let number_str = &duration_str[..split_idx];
    let unit_str = &duration_str[split_idx..];

    let number: f64 = number_str
        .parse()
        .map_err(|_| invalid(format!("invalid number in duration: '{}'", number_str)))?;

    let seconds = match unit_str {
        "ms" => number / 1000.0,
        "s" | "sec" => number,
        "m" | "min" => number * 60.0,
        "h" | "hr" => number * 3600.0,
        _ => {
            return Err(invalid(format!(
                "invalid duration unit: '{}'. Valid units: ms, s, m, h",
                unit_str
            )));
        }
    };

    let duration = Duration::try_from_secs_f64(seconds)
        .map_err(|_| invalid(format!("duration out of range: '{}'", duration_str)))?;
    if duration.is_zero() {
        return Err(invalid(format!(
            "duration must be greater than zero: '{}'",
            duration_str
        )));
    }
    Ok(duration)
}
