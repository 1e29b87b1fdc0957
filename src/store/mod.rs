//! # Hierarchical Store Clients
//!
//! This module defines the `KeyValueStore` trait, the interface the import
//! and export logic uses to talk to a hierarchical key-value store, together
//! with the node type the store returns.
//!
//! ## Design
//!
//! The store is modelled after the etcd v2 keys API: every node is either a
//! directory (children, no value) or a leaf (a value, no children), and
//! writes and deletes take option structs that select directory or recursive
//! behaviour. Two implementations are provided:
//!
//! - **`EtcdStore`**: talks to a real server over HTTP.
//! - **`MemoryStore`**: an in-process tree with the same error semantics,
//!   used by tests and benchmarks to observe exactly which mutations an
//!   import performs.
//!
//! Every method is a single round trip. Nothing is cached between calls, so
//! each answer reflects the store at the moment it was asked.

pub mod etcd;
pub mod memory;

pub use etcd::EtcdStore;
pub use memory::MemoryStore;

use crate::error::Result;
use serde::Deserialize;

/// Error code the store uses for "key not found".
pub const KEY_NOT_FOUND: u64 = 100;
/// Error code for writing a value onto a directory.
pub const NOT_A_FILE: u64 = 102;
/// Error code for treating a leaf as a directory.
pub const NOT_A_DIRECTORY: u64 = 104;
/// Error code for creating a node that already exists.
pub const NODE_EXIST: u64 = 105;
/// Error code for deleting a non-empty directory without `recursive`.
pub const DIRECTORY_NOT_EMPTY: u64 = 108;

/// A node returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Node {
    /// Full path of the node.
    #[serde(default)]
    pub key: String,
    /// Whether the node is a directory.
    #[serde(default)]
    pub dir: bool,
    /// Leaf value; always `None` for directories.
    #[serde(default)]
    pub value: Option<String>,
    /// Children, present only for recursive reads of directories.
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Node {
    /// Build a leaf node.
    pub fn leaf(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            dir: false,
            value: Some(value.into()),
            nodes: Vec::new(),
        }
    }

    /// Build a directory node with the given children.
    pub fn directory(key: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            key: key.into(),
            dir: true,
            value: None,
            nodes,
        }
    }
}

/// Options for [`KeyValueStore::get`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
    /// Return the whole subtree instead of just the node and its direct listing.
    pub recursive: bool,
}

/// Options for [`KeyValueStore::set`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SetOptions {
    /// Create a directory instead of a leaf; the value is ignored.
    pub dir: bool,
}

/// Options for [`KeyValueStore::delete`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteOptions {
    /// Delete a directory together with everything below it.
    pub recursive: bool,
}

/// Interface to a hierarchical key-value store.
///
/// Paths are normalized store paths (see [`crate::path::normalize`]).
/// A missing node is reported as [`crate::error::Error::KeyNotFound`] so
/// callers can tell it apart from every other failure.
pub trait KeyValueStore: Send + Sync {
    /// Read the node at `path`.
    fn get(&self, path: &str, options: GetOptions) -> Result<Node>;

    /// Write a leaf value, or create a directory when `options.dir` is set.
    ///
    /// Missing parent directories are created implicitly.
    fn set(&self, path: &str, value: &str, options: SetOptions) -> Result<()>;

    /// Delete the node at `path`.
    fn delete(&self, path: &str, options: DeleteOptions) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, path: &str, options: GetOptions) -> Result<Node> {
        (**self).get(path, options)
    }

    fn set(&self, path: &str, value: &str, options: SetOptions) -> Result<()> {
        (**self).set(path, value, options)
    }

    fn delete(&self, path: &str, options: DeleteOptions) -> Result<()> {
        (**self).delete(path, options)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, path: &str, options: GetOptions) -> Result<Node> {
        (**self).get(path, options)
    }

    fn set(&self, path: &str, value: &str, options: SetOptions) -> Result<()> {
        (**self).set(path, value, options)
    }

    fn delete(&self, path: &str, options: DeleteOptions) -> Result<()> {
        (**self).delete(path, options)
    }
}
