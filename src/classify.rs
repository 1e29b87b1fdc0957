//! Destination path classification
//!
//! Before an import touches anything it asks the store, once, what currently
//! lives at the destination. The answer drives the reconciliation table in
//! [`crate::import`].

use crate::error::Result;
use crate::store::{GetOptions, KeyValueStore};
use std::fmt;

/// What exists at a store path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Nothing exists at the path.
    NotFound,
    /// A directory exists at the path.
    ExistsAsDirectory,
    /// A leaf value exists at the path.
    ExistsAsLeaf,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Classification::NotFound => "not found",
            Classification::ExistsAsDirectory => "directory",
            Classification::ExistsAsLeaf => "leaf",
        })
    }
}

/// Classify `path` with a single non-recursive read.
///
/// A "key not found" answer becomes [`Classification::NotFound`]; every other
/// store failure is returned unchanged.
pub fn classify<S: KeyValueStore + ?Sized>(store: &S, path: &str) -> Result<Classification> {
    match store.get(path, GetOptions::default()) {
        Ok(node) if node.dir => Ok(Classification::ExistsAsDirectory),
        Ok(_) => Ok(Classification::ExistsAsLeaf),
        Err(e) if e.is_key_not_found() => Ok(Classification::NotFound),
        Err(e) => Err(e),
    }
}
