//! # Error Handling
//!
//! This module defines the centralized error type for `keyport`. It uses the
//! `thiserror` library to build a single `Error` enum covering every failure
//! the library can surface, each with a message that is readable on its own
//! when printed to the terminal.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all failure modes. Variants carry the store path,
//!   file or URL involved so the message points at the offending input.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library.
//!
//! The variants fall into a few groups:
//!
//! - Configuration and document loading (`ConfigParse`, `UnsupportedFormat`,
//!   `DocumentParse`, `InvalidDocument`).
//! - Store responses (`KeyNotFound`, `Store`, `NotADirectory`).
//! - Transport failures, including timeouts (`Network`).
//! - Operator interaction (`Prompt`).
//! - Wrapped library errors (`Io`, `Yaml`, `Json`, `Toml`, `UrlParse`).
//!
//! `KeyNotFound` is kept apart from the generic `Store` variant because the
//! path classifier treats it as an answer ("the path does not exist") rather
//! than a failure.

use thiserror::Error;

/// Main error type for keyport operations
#[derive(Error, Debug)]
pub enum Error {
    /// The settings file could not be parsed or holds an invalid value.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A serialization format tag that keyport does not know.
    #[error("Unsupported data format: {format} (expected JSON, YAML or TOML)")]
    UnsupportedFormat { format: String },

    /// The input document could not be parsed in the declared format.
    #[error("Failed to parse {path} as {format}: {message}")]
    DocumentParse {
        path: String,
        format: String,
        message: String,
    },

    /// The document parsed, but cannot be projected onto a store subtree.
    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    /// The store reported that no node exists at `path` (etcd error code 100).
    #[error("Key not found: {path}")]
    KeyNotFound { path: String },

    /// Any other error response from the store.
    #[error("Store error at {path}{}: {message}", code.map(|c| format!(" (code {})", c)).unwrap_or_default())]
    Store {
        path: String,
        /// Store-specific error code, when the store supplied one
        code: Option<u64>,
        message: String,
    },

    /// A directory was required at `path` but a leaf node exists there.
    #[error("Specified dir is not a directory: {path}")]
    NotADirectory { path: String },

    /// The store could not be reached, or the request timed out.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// Reading the operator's answer failed.
    #[error("Prompt error: {message}")]
    Prompt { message: String },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An error occurred while rendering a document.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A TOML error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Whether this error means "nothing exists at the requested path".
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_parse() {
        let error = Error::ConfigParse {
            message: "invalid duration '5x'".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("invalid duration '5x'"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "peer 'ftp://host' is not an http(s) URL".to_string(),
            hint: Some("Use http://host:2379".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("hint:"));
        assert!(display.contains("http://host:2379"));
    }

    #[test]
    fn test_error_display_store_with_code() {
        let error = Error::Store {
            path: "/app/config".to_string(),
            code: Some(102),
            message: "Not a file".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Store error at /app/config (code 102): Not a file"
        );
    }

    #[test]
    fn test_error_display_store_without_code() {
        let error = Error::Store {
            path: "/app".to_string(),
            code: None,
            message: "HTTP 500".to_string(),
        };
        assert_eq!(error.to_string(), "Store error at /app: HTTP 500");
    }

    #[test]
    fn test_error_display_not_a_directory() {
        let error = Error::NotADirectory {
            path: "/app/config".to_string(),
        };
        assert!(error.to_string().contains("not a directory"));
        assert!(error.to_string().contains("/app/config"));
    }

    #[test]
    fn test_error_display_document_parse() {
        let error = Error::DocumentParse {
            path: "input.yaml".to_string(),
            format: "YAML".to_string(),
            message: "unexpected end of stream".to_string(),
        };
        let display = error.to_string();
        assert!(display.contains("input.yaml"));
        assert!(display.contains("YAML"));
        assert!(display.contains("unexpected end of stream"));
    }

    #[test]
    fn test_is_key_not_found() {
        let missing = Error::KeyNotFound {
            path: "/a".to_string(),
        };
        let other = Error::Store {
            path: "/a".to_string(),
            code: Some(100),
            message: "Key not found".to_string(),
        };
        assert!(missing.is_key_not_found());
        assert!(!other.is_key_not_found());
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(error.to_string().contains("YAML parsing error"));
    }

    #[test]
    fn test_error_from_url_error() {
        let url_error = url::Url::parse("not a url").unwrap_err();
        let error: Error = url_error.into();
        assert!(error.to_string().contains("URL parsing error"));
    }
}
