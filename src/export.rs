//! Reading a store subtree back into a [`Document`]
//!
//! The inverse of the mapper: directories become mappings (or sequences when
//! their children are named exactly `0..n-1`), leaves become string scalars.
//! The store keeps no type information, so `5432` comes back as `"5432"`.

use crate::document::{sequence_from_indexed, Document};
use crate::error::{Error, Result};
use crate::path;
use crate::store::{GetOptions, KeyValueStore, Node};
use std::collections::BTreeMap;

/// Convert a recursively fetched node into a document.
pub fn node_to_document(node: &Node) -> Document {
    if !node.dir {
        return Document::string(node.value.clone().unwrap_or_default());
    }
    let children: BTreeMap<String, Document> = node
        .nodes
        .iter()
        .map(|child| (path::file_name(&child.key).to_string(), node_to_document(child)))
        .collect();
    sequence_from_indexed(children)
}

/// Fetch the directory at `directory` and everything below it.
///
/// Exporting a leaf is refused, since a scalar has no place in a
/// mapping-rooted file.
pub fn export<S: KeyValueStore + ?Sized>(store: &S, directory: &str) -> Result<Document> {
    let directory = path::normalize(directory);
    let node = store.get(&directory, GetOptions { recursive: true })?;
    if !node.dir {
        return Err(Error::NotADirectory { path: directory });
    }
    Ok(node_to_document(&node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_leaf_becomes_string() {
        let doc = node_to_document(&Node::leaf("/a/port", "5432"));
        assert_eq!(doc, Document::string("5432"));
    }

    #[test]
    fn test_indexed_directory_becomes_sequence() {
        let node = Node::directory(
            "/list",
            vec![Node::leaf("/list/1", "b"), Node::leaf("/list/0", "a")],
        );
        assert_eq!(
            node_to_document(&node),
            Document::Sequence(vec![Document::string("a"), Document::string("b")])
        );
    }

    #[test]
    fn test_gapped_indices_stay_mapping() {
        let node = Node::directory(
            "/list",
            vec![Node::leaf("/list/0", "a"), Node::leaf("/list/2", "c")],
        );
        assert!(matches!(node_to_document(&node), Document::Mapping(_)));
    }

    #[test]
    fn test_export_subtree() {
        let store = MemoryStore::new()
            .with_leaf("/app/db/host", "db1")
            .with_leaf("/app/hosts/0", "h1")
            .with_leaf("/app/hosts/1", "h2")
            .with_dir("/app/empty");

        let expected: Document = json!({
            "db": {"host": "db1"},
            "hosts": ["h1", "h2"],
            "empty": {}
        })
        .into();
        assert_eq!(export(&store, "/app/").unwrap(), expected);
    }

    #[test]
    fn test_export_missing_and_leaf() {
        let store = MemoryStore::new().with_leaf("/flat", "x");
        assert!(export(&store, "/missing").unwrap_err().is_key_not_found());
        assert!(matches!(
            export(&store, "/flat").unwrap_err(),
            Error::NotADirectory { .. }
        ));
    }
}
