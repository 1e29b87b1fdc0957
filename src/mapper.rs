//! # Tree Mapper
//!
//! Projects a [`Document`] onto store operations, depth first:
//!
//! - a mapping becomes a directory with one child per key,
//! - a sequence becomes a directory with one child per index (`0`, `1`, ...),
//! - a scalar becomes a leaf holding [`Scalar::canonical`](crate::document::Scalar::canonical).
//!
//! ## Modes
//!
//! In [`MapMode::CreateFresh`] the destination subtree is known to be empty,
//! so directories are created without looking first. In
//! [`MapMode::MergeInPlace`] each directory is checked: an existing one is
//! reused, a missing one is created, and a leaf in its place is an error.
//! Leaves are always written unconditionally. Nothing is ever deleted, so
//! keys that exist in the store but not in the document survive a merge.
//!
//! The first failing store operation stops the traversal; operations already
//! applied are not undone.

use crate::classify::{classify, Classification};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::path;
use crate::store::{KeyValueStore, SetOptions};
use log::debug;

/// How the mapper treats paths that may already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    /// The destination was emptied or never existed.
    CreateFresh,
    /// The destination holds data that must be kept unless overwritten.
    MergeInPlace,
}

/// Counts of the store writes a mapping performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapStats {
    /// Directories created.
    pub directories: usize,
    /// Leaves written.
    pub leaves: usize,
}

/// Writes documents into a store.
pub struct TreeMapper<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    mode: MapMode,
    stats: MapStats,
}

impl<'a, S: KeyValueStore + ?Sized> TreeMapper<'a, S> {
    pub fn new(store: &'a S, mode: MapMode) -> Self {
        Self {
            store,
            mode,
            stats: MapStats::default(),
        }
    }

    /// Write the children of `document` beneath `base`, which must already
    /// exist as a directory.
    ///
    /// The document root has to be a mapping or a sequence; a scalar cannot
    /// be placed inside a directory.
    pub fn map(mut self, document: &Document, base: &str) -> Result<MapStats> {
        match document {
            Document::Mapping(map) => {
                for (key, value) in map {
                    self.map_node(value, &path::join(base, key))?;
                }
            }
            Document::Sequence(items) => {
                for (index, value) in items.iter().enumerate() {
                    self.map_node(value, &path::join(base, &index.to_string()))?;
                }
            }
            Document::Scalar(_) => {
                return Err(Error::InvalidDocument {
                    message: "the document root must be a mapping or a sequence".to_string(),
                });
            }
        }
        Ok(self.stats)
    }

    fn map_node(&mut self, document: &Document, at: &str) -> Result<()> {
        match document {
            Document::Scalar(scalar) => {
                let value = scalar.canonical();
                debug!("set {} = {:?}", at, value);
                self.store.set(at, &value, SetOptions::default())?;
                self.stats.leaves += 1;
            }
            Document::Mapping(map) => {
                self.ensure_directory(at)?;
                for (key, value) in map {
                    self.map_node(value, &path::join(at, key))?;
                }
            }
            Document::Sequence(items) => {
                self.ensure_directory(at)?;
                for (index, value) in items.iter().enumerate() {
                    self.map_node(value, &path::join(at, &index.to_string()))?;
                }
            }
        }
        Ok(())
    }

    fn ensure_directory(&mut self, at: &str) -> Result<()> {
        if self.mode == MapMode::MergeInPlace {
            match classify(self.store, at)? {
                Classification::ExistsAsDirectory => return Ok(()),
                Classification::ExistsAsLeaf => {
                    return Err(Error::NotADirectory {
                        path: at.to_string(),
                    });
                }
                Classification::NotFound => {}
            }
        }
        debug!("mkdir {}", at);
        self.store.set(at, "", SetOptions { dir: true })?;
        self.stats.directories += 1;
        Ok(())
    }
}
