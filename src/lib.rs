//! # keyport
//!
//! Imports structured documents (JSON, YAML, TOML) into a hierarchical
//! key-value store such as etcd, and exports store subtrees back into
//! documents. Mappings and sequences become directories, scalars become
//! leaves holding their canonical text.
//!
//! ## Quick Example
//!
//! ```
//! use keyport::confirm::LinePrompt;
//! use keyport::format::{self, Format};
//! use keyport::import::{import, ImportOptions, ImportOutcome};
//! use keyport::store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let document = format::parse_str(r#"{"db": {"host": "db1", "port": 5432}}"#, Format::Json).unwrap();
//!
//! // Nothing exists at the destination, so no question is asked.
//! let mut gate = LinePrompt::new(std::io::empty(), std::io::sink());
//! let outcome = import(&store, &mut gate, "/app/config", &document, ImportOptions::default()).unwrap();
//!
//! assert!(matches!(outcome, ImportOutcome::Completed(_)));
//! assert_eq!(store.leaves_under("/app/config")["db/port"], "5432");
//! ```
//!
//! ## Core Concepts
//!
//! - **Documents (`document`, `format`)**: a format-neutral tree of mappings,
//!   sequences and scalars, loaded from and rendered to files.
//! - **Stores (`store`)**: the `KeyValueStore` trait with an etcd v2 HTTP
//!   client and an in-memory implementation.
//! - **Import (`classify`, `import`, `mapper`, `confirm`)**: classify the
//!   destination, pick a strategy, ask for confirmation when data would be
//!   overwritten, then write the document depth first.
//! - **Export (`export`)**: read a subtree back into a document.
//! - **Settings (`config`, `defaults`)**: peers, timeouts, credentials and
//!   TLS files, layered from defaults, a TOML file and the command line.

pub mod classify;
pub mod config;
pub mod confirm;
pub mod defaults;
pub mod document;
pub mod error;
pub mod exit_codes;
pub mod export;
pub mod format;
pub mod import;
pub mod mapper;
pub mod output;
pub mod path;
pub mod store;
pub mod suggestions;

#[cfg(test)]
mod path_proptest;
