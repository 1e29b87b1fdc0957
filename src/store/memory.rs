//! In-memory store implementation
//!
//! `MemoryStore` keeps the whole hierarchy in a flat map from path to entry
//! and reproduces the error codes a real etcd v2 server returns for the
//! operations keyport performs. Every mutation is recorded so tests can
//! assert exactly what an import did, and individual paths can be made to
//! fail to exercise fail-fast behaviour.

use super::{
    DeleteOptions, GetOptions, KeyValueStore, Node, SetOptions, DIRECTORY_NOT_EMPTY,
    NOT_A_DIRECTORY, NOT_A_FILE,
};
use crate::error::{Error, Result};
use crate::path;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

/// Error code for attempts to modify the root.
const ROOT_READ_ONLY: u64 = 107;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Directory,
    Leaf(String),
}

/// A mutation applied to a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// A leaf value was written.
    Set { path: String, value: String },
    /// A directory was created.
    MakeDir { path: String },
    /// A node was deleted.
    Delete { path: String, recursive: bool },
}

#[derive(Debug, Default)]
struct State {
    /// Every node except the root, keyed by normalized path.
    entries: BTreeMap<String, Entry>,
    mutations: Vec<Mutation>,
    reads: usize,
    failing: BTreeSet<String>,
}

/// In-memory hierarchical store for tests and benchmarks
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create a new empty store containing only the root directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a leaf value, creating parent directories; not recorded as a mutation.
    pub fn with_leaf(self, path: &str, value: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            let path = path::normalize(path);
            state.create_parents(&path);
            state.entries.insert(path, Entry::Leaf(value.to_string()));
        }
        self
    }

    /// Seed an empty directory, creating parent directories; not recorded.
    pub fn with_dir(self, path: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            let path = path::normalize(path);
            state.create_parents(&path);
            state.entries.insert(path, Entry::Directory);
        }
        self
    }

    /// Make every mutation of `path` fail with a store error.
    pub fn fail_on(self, path: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.failing.insert(path::normalize(path));
        }
        self
    }

    /// Mutations applied so far, oldest first.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.lock().map(|s| s.mutations.clone()).unwrap_or_default()
    }

    /// Number of `get` calls served so far.
    pub fn reads(&self) -> usize {
        self.lock().map(|s| s.reads).unwrap_or_default()
    }

    /// Whether a node exists at `path`.
    pub fn exists(&self, path: &str) -> bool {
        let path = path::normalize(path);
        path == "/"
            || self
                .lock()
                .map(|s| s.entries.contains_key(&path))
                .unwrap_or(false)
    }

    /// Every leaf below `base`, keyed by path relative to `base`.
    pub fn leaves_under(&self, base: &str) -> BTreeMap<String, String> {
        let base = path::normalize(base);
        let Ok(state) = self.lock() else {
            return BTreeMap::new();
        };
        state
            .entries
            .iter()
            .filter_map(|(key, entry)| match entry {
                Entry::Leaf(value) => path::relative_to(&base, key)
                    .filter(|rel| !rel.is_empty())
                    .map(|rel| (rel.to_string(), value.clone())),
                Entry::Directory => None,
            })
            .collect()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| Error::LockPoisoned {
            context: "memory store".to_string(),
        })
    }
}

impl State {
    fn create_parents(&mut self, path: &str) {
        let segments = path::segments(path);
        let mut current = String::from("/");
        for segment in segments.iter().take(segments.len().saturating_sub(1)) {
            current = path::join(&current, segment);
            self.entries
                .entry(current.clone())
                .or_insert(Entry::Directory);
        }
    }

    fn entry(&self, path: &str) -> Option<Entry> {
        if path == "/" {
            Some(Entry::Directory)
        } else {
            self.entries.get(path).cloned()
        }
    }

    fn children(&self, path: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|key| {
                path::relative_to(path, key)
                    .map(|rel| !rel.is_empty() && !rel.contains('/'))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    fn node(&self, path: &str, depth: Option<usize>) -> Node {
        match self.entry(path) {
            Some(Entry::Leaf(value)) => Node::leaf(path, value),
            _ => {
                let nodes = match depth {
                    Some(0) => Vec::new(),
                    _ => self
                        .children(path)
                        .iter()
                        .map(|child| self.node(child, depth.map(|d| d - 1)))
                        .collect(),
                };
                Node::directory(path, nodes)
            }
        }
    }

    /// Check that no ancestor of `path` is a leaf.
    fn check_parents(&self, path: &str) -> Result<()> {
        let segments = path::segments(path);
        let mut current = String::from("/");
        for segment in segments.iter().take(segments.len().saturating_sub(1)) {
            current = path::join(&current, segment);
            if let Some(Entry::Leaf(_)) = self.entries.get(&current) {
                return Err(store_error(&current, NOT_A_DIRECTORY, "Not a directory"));
            }
        }
        Ok(())
    }

    fn check_failing(&self, path: &str) -> Result<()> {
        if self.failing.contains(path) {
            return Err(Error::Store {
                path: path.to_string(),
                code: None,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

fn store_error(path: &str, code: u64, message: &str) -> Error {
    Error::Store {
        path: path.to_string(),
        code: Some(code),
        message: message.to_string(),
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, path: &str, options: GetOptions) -> Result<Node> {
        let mut state = self.lock()?;
        state.reads += 1;
        let path = path::normalize(path);
        if state.entry(&path).is_none() {
            return Err(Error::KeyNotFound { path });
        }
        // A plain read lists direct children without their contents.
        let depth = if options.recursive { None } else { Some(1) };
        Ok(state.node(&path, depth))
    }

    fn set(&self, path: &str, value: &str, options: SetOptions) -> Result<()> {
        let mut state = self.lock()?;
        let path = path::normalize(path);
        state.check_failing(&path)?;
        if path == "/" {
            return Err(store_error(&path, ROOT_READ_ONLY, "Root is read only"));
        }
        if let Some(Entry::Directory) = state.entry(&path) {
            return Err(store_error(&path, NOT_A_FILE, "Not a file"));
        }
        state.check_parents(&path)?;
        state.create_parents(&path);

        if options.dir {
            state.entries.insert(path.clone(), Entry::Directory);
            state.mutations.push(Mutation::MakeDir { path });
        } else {
            state
                .entries
                .insert(path.clone(), Entry::Leaf(value.to_string()));
            state.mutations.push(Mutation::Set {
                path,
                value: value.to_string(),
            });
        }
        Ok(())
    }

    fn delete(&self, path: &str, options: DeleteOptions) -> Result<()> {
        let mut state = self.lock()?;
        let path = path::normalize(path);
        state.check_failing(&path)?;
        if path == "/" {
            return Err(store_error(&path, ROOT_READ_ONLY, "Root is read only"));
        }
        match state.entry(&path) {
            None => {
                return Err(Error::KeyNotFound { path });
            }
            Some(Entry::Directory) if !options.recursive && !state.children(&path).is_empty() => {
                return Err(store_error(&path, DIRECTORY_NOT_EMPTY, "Directory not empty"));
            }
            Some(_) => {}
        }

        state
            .entries
            .retain(|key, _| path::relative_to(&path, key).is_none());
        state.mutations.push(Mutation::Delete {
            path,
            recursive: options.recursive,
        });
        Ok(())
    }
}
