//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use dialoguer::Password;
use keyport::config::{Overrides, Settings};
use keyport::output::OutputConfig;
use keyport::store::EtcdStore;
use keyport::suggestions;
use log::debug;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::commands;

/// keyport - Import and export structured documents into etcd-style key-value stores
#[derive(Parser, Debug)]
#[command(name = "keyport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Settings file (TOML)
    #[arg(long, global = true, value_name = "FILE", env = "KEYPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Comma-separated list of store endpoints
    #[arg(long, global = true, value_name = "URLS", env = "KEYPORT_PEERS")]
    peers: Option<String>,

    /// Connection timeout per peer (e.g. 500ms, 1s)
    #[arg(long, global = true, value_name = "DURATION")]
    timeout: Option<String>,

    /// Timeout for a single store request (e.g. 5s)
    #[arg(long, global = true, value_name = "DURATION")]
    command_timeout: Option<String>,

    /// Credentials for the store, as NAME or NAME:PASSWORD
    #[arg(long, global = true, value_name = "USER", env = "KEYPORT_USER")]
    user: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a JSON, YAML or TOML document into a store directory
    Import(commands::import::ImportArgs),

    /// Export a store directory as a JSON, YAML or TOML document
    Export(commands::export::ExportArgs),

    /// Display the keys under a store directory
    Tree(commands::tree::TreeArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// State shared by every command of one invocation.
pub struct Context {
    pub output: OutputConfig,
    config: Option<PathBuf>,
    overrides: Overrides,
}

impl Context {
    /// Resolve the layered settings, asking for a password when a user
    /// name was given without one and a terminal is attached.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref(), &self.overrides)
            .map_err(suggestions::explain)?;

        if let Some(credentials) = settings.credentials.as_mut() {
            if credentials.password.is_none() && std::io::stdin().is_terminal() {
                let password = Password::new()
                    .with_prompt(format!("Password for {}", credentials.username))
                    .interact()?;
                credentials.password = Some(password);
            }
        }

        debug!("resolved settings: {:?}", settings);
        Ok(settings)
    }

    /// Build the store client from the resolved settings.
    pub fn store(&self) -> Result<EtcdStore> {
        EtcdStore::new(&self.settings()?).map_err(suggestions::explain)
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> ExitCode {
        init_logging(&self.log_level);

        let output = OutputConfig::from_env_and_flag(&self.color);
        output.apply();

        let context = Context {
            output,
            config: self.config,
            overrides: Overrides {
                peers: self.peers,
                timeout: self.timeout,
                command_timeout: self.command_timeout,
                user: self.user,
            },
        };

        let result = match self.command {
            Commands::Import(args) => commands::import::execute(args, &context),
            Commands::Export(args) => commands::export::execute(args, &context),
            Commands::Tree(args) => commands::tree::execute(args, &context),
            Commands::Completions(args) => commands::completions::execute(args),
        };

        match result {
            Ok(code) => code,
            Err(err) => {
                eprintln!("Error: {:#}", err);
                keyport::exit_codes::failure()
            }
        }
    }
}

/// Initialise `env_logger`; `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
