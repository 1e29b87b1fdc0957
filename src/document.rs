//! # Documents
//!
//! A `Document` is the in-memory tree that every input format is loaded into
//! and every export is rendered from. It is an explicit sum type: mappings,
//! sequences and scalars. Traversals match on it exhaustively instead of
//! inspecting types at runtime.
//!
//! Mappings are kept in a `BTreeMap`, so every traversal visits keys in the
//! same (sorted) order regardless of the order they appeared in the input.
//!
//! ## Store form
//!
//! Once a document is written into the store, every scalar becomes a string
//! and the distinction between "empty sequence" and "empty mapping" is lost
//! (both are empty directories). [`Document::to_store_form`] applies the same
//! loss in memory, which is what an export of an imported document returns.

use crate::error::{Error, Result};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar document value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// The text stored for this scalar in a leaf node.
    ///
    /// Strings are stored verbatim, numbers in their shortest display form
    /// (`5432`, `1.5`), booleans as `true`/`false` and null as the empty string.
    pub fn canonical(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// A structured document: a tree of mappings, sequences and scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Scalar(Scalar),
    Sequence(Vec<Document>),
    Mapping(BTreeMap<String, Document>),
}

impl Document {
    /// Shorthand for a string scalar.
    pub fn string(value: impl Into<String>) -> Self {
        Document::Scalar(Scalar::String(value.into()))
    }

    /// Whether this node maps onto a directory in the store.
    pub fn is_container(&self) -> bool {
        !matches!(self, Document::Scalar(_))
    }

    /// Check that every mapping key names a usable store path.
    ///
    /// Keys may contain `/` to reach deeper directories, but no segment of a
    /// key may be empty, `.` or `..`.
    pub fn validate_keys(&self) -> Result<()> {
        validate_keys_at(self, "")
    }

    /// Every scalar reachable from this node, keyed by its slash-separated
    /// path relative to this node, with its canonical text.
    ///
    /// A scalar root yields a single entry with an empty path.
    pub fn leaves(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        collect_leaves(self, String::new(), &mut out);
        out
    }

    /// The document an export would produce after importing this one.
    ///
    /// Scalars become their canonical strings, empty sequences become empty
    /// mappings, and mappings whose keys are exactly `0..n` become sequences.
    pub fn to_store_form(&self) -> Document {
        match self {
            Document::Scalar(s) => Document::string(s.canonical()),
            Document::Sequence(items) if items.is_empty() => Document::Mapping(BTreeMap::new()),
            Document::Sequence(items) => {
                Document::Sequence(items.iter().map(Document::to_store_form).collect())
            }
            Document::Mapping(map) => {
                let converted: BTreeMap<String, Document> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_store_form()))
                    .collect();
                sequence_from_indexed(converted)
            }
        }
    }
}

fn collect_leaves(doc: &Document, prefix: String, out: &mut BTreeMap<String, String>) {
    let child_path = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", prefix, key)
        }
    };
    match doc {
        Document::Scalar(s) => {
            out.insert(prefix, s.canonical());
        }
        Document::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_leaves(item, child_path(&i.to_string()), out);
            }
        }
        Document::Mapping(map) => {
            for (key, value) in map {
                collect_leaves(value, child_path(key), out);
            }
        }
    }
}

/// Turn a mapping into a sequence when its keys are exactly `"0".."n-1"`.
///
/// Empty mappings stay mappings.
pub(crate) fn sequence_from_indexed(map: BTreeMap<String, Document>) -> Document {
    let is_indexed = !map.is_empty()
        && (0..map.len()).all(|i| map.contains_key(&i.to_string()));
    if !is_indexed {
        return Document::Mapping(map);
    }
    let mut map = map;
    let items = (0..map.len())
        .filter_map(|i| map.remove(&i.to_string()))
        .collect();
    Document::Sequence(items)
}

fn validate_keys_at(document: &Document, at: &str) -> Result<()> {
    match document {
        Document::Scalar(_) => Ok(()),
        Document::Sequence(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(index, item)| validate_keys_at(item, &format!("{}/{}", at, index))),
        Document::Mapping(map) => {
            for (key, value) in map {
                if key.split('/').any(|segment| matches!(segment, "" | "." | "..")) {
                    return Err(Error::InvalidDocument {
                        message: format!(
                            "key {:?} under '{}' cannot be used as a store path",
                            key,
                            if at.is_empty() { "/" } else { at }
                        ),
                    });
                }
                validate_keys_at(value, &format!("{}/{}", at, key))?;
            }
            Ok(())
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Document::Scalar(Scalar::Null) => serializer.serialize_unit(),
            Document::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Document::Scalar(Scalar::Integer(i)) => serializer.serialize_i64(*i),
            Document::Scalar(Scalar::Float(f)) => serializer.serialize_f64(*f),
            Document::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
            Document::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Document::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

////// CONVERSION IMPLEMENTATIONS //////

impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Document::Scalar(Scalar::Null),
            Value::Bool(b) => Document::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Document::Scalar(json_number(&n)),
            Value::String(s) => Document::string(s),
            Value::Array(items) => Document::Sequence(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                Document::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

fn json_number(n: &serde_json::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Integer(i)
    } else if n.is_u64() {
        // Beyond i64: keep the exact digits rather than rounding through f64.
        Scalar::String(n.to_string())
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl TryFrom<serde_yaml::Value> for Document {
    type Error = Error;

    fn try_from(value: serde_yaml::Value) -> Result<Self> {
        use serde_yaml::Value;
        Ok(match value {
            Value::Null => Document::Scalar(Scalar::Null),
            Value::Bool(b) => Document::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Document::Scalar(yaml_number(&n)),
            Value::String(s) => Document::string(s),
            Value::Sequence(items) => Document::Sequence(
                items
                    .into_iter()
                    .map(Document::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Mapping(map) => {
                let mut out = BTreeMap::new();
                for (key, value) in map {
                    out.insert(yaml_key(key)?, Document::try_from(value)?);
                }
                Document::Mapping(out)
            }
            Value::Tagged(tagged) => Document::try_from(tagged.value)?,
        })
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Integer(i)
    } else if n.is_u64() {
        Scalar::String(n.to_string())
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Mapping keys become path segments, so only scalar keys are accepted.
fn yaml_key(key: serde_yaml::Value) -> Result<String> {
    use serde_yaml::Value;
    match key {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(yaml_number(&n).canonical()),
        Value::Null => Ok("null".to_string()),
        Value::Tagged(tagged) => yaml_key(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => Err(Error::InvalidDocument {
            message: "mapping keys must be scalars".to_string(),
        }),
    }
}

impl From<toml::Value> for Document {
    fn from(value: toml::Value) -> Self {
        use toml::Value;
        match value {
            Value::String(s) => Document::string(s),
            Value::Integer(i) => Document::Scalar(Scalar::Integer(i)),
            Value::Float(f) => Document::Scalar(Scalar::Float(f)),
            Value::Boolean(b) => Document::Scalar(Scalar::Bool(b)),
            Value::Datetime(dt) => Document::string(dt.to_string()),
            Value::Array(items) => Document::Sequence(items.into_iter().map(Into::into).collect()),
            Value::Table(table) => {
                Document::Mapping(table.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
