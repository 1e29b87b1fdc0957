//! # Data Formats
//!
//! Loading and rendering of documents in the supported serialization formats.
//!
//! - **JSON** via `serde_json`
//! - **YAML** via `serde_yaml`
//! - **TOML** via `toml`
//!
//! Each format is parsed into its library's value type first and then
//! converted into a [`Document`], so format quirks (YAML tags, TOML
//! datetimes, non-string YAML keys) are resolved in one place.

use crate::document::Document;
use crate::error::{Error, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// A serialization format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// All supported formats, in the order they are listed to users.
    pub const ALL: [Format; 3] = [Format::Json, Format::Yaml, Format::Toml];

    /// Upper-case display name, as used in messages.
    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            _ => Err(Error::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Load a document from `path` in the given format.
pub fn load<P: AsRef<Path>>(path: P, format: Format) -> Result<Document> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    parse_str(&content, format).map_err(|e| Error::DocumentParse {
        path: path.display().to_string(),
        format: format.name().to_string(),
        message: parse_message(e),
    })
}

/// Parse a document from an in-memory string.
pub fn parse_str(content: &str, format: Format) -> Result<Document> {
    match format {
        Format::Json => {
            let value: serde_json::Value = serde_json::from_str(content)?;
            Ok(value.into())
        }
        Format::Yaml => {
            let value: serde_yaml::Value = serde_yaml::from_str(content)?;
            Document::try_from(value)
        }
        Format::Toml => {
            let value: toml::Value = toml::from_str(content)?;
            Ok(value.into())
        }
    }
}

/// Strip the wrapper prefix from library errors so the message reads cleanly
/// inside `DocumentParse`.
fn parse_message(error: Error) -> String {
    match error {
        Error::Json(e) => e.to_string(),
        Error::Yaml(e) => e.to_string(),
        Error::Toml(e) => e.message().to_string(),
        other => other.to_string(),
    }
}

/// Render a document as text in the given format.
///
/// TOML can only represent a table at the top level, so sequences and
/// scalars are rejected there.
pub fn render(document: &Document, format: Format) -> Result<String> {
    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(document).map(|mut s| {
            s.push('\n');
            s
        })?,
        Format::Yaml => serde_yaml::to_string(document)?,
        Format::Toml => {
            if !matches!(document, Document::Mapping(_)) {
                return Err(Error::Serialization {
                    message: "TOML output requires a mapping at the top level".to_string(),
                });
            }
            toml::to_string(document).map_err(|e| Error::Serialization {
                message: e.to_string(),
            })?
        }
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_from_str_is_case_insensitive() {
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("Yaml".parse::<Format>().unwrap(), Format::Yaml);
        assert_eq!("yml".parse::<Format>().unwrap(), Format::Yaml);
        assert_eq!("TOML".parse::<Format>().unwrap(), Format::Toml);
    }

    #[test]
    fn test_format_from_str_rejects_unknown() {
        let err = "xml".parse::<Format>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { ref format } if format == "xml"));
    }

    #[test]
    fn test_parse_each_format_to_same_leaves() {
        let json = r#"{"db": {"host": "db1", "port": 5432}}"#;
        let yaml = "db:\n  host: db1\n  port: 5432\n";
        let toml = "[db]\nhost = \"db1\"\nport = 5432\n";

        let expected = parse_str(json, Format::Json).unwrap().leaves();
        assert_eq!(parse_str(yaml, Format::Yaml).unwrap().leaves(), expected);
        assert_eq!(parse_str(toml, Format::Toml).unwrap().leaves(), expected);
    }

    #[test]
    fn test_load_reports_path_and_format() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"unterminated\": ").unwrap();

        let err = load(file.path(), Format::Json).unwrap_err();
        match err {
            Error::DocumentParse { path, format, .. } => {
                assert_eq!(path, file.path().display().to_string());
                assert_eq!(format, "JSON");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load("/nonexistent/input.json", Format::Json).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_render_json_is_pretty() {
        let doc = parse_str(r#"{"a": {"b": "c"}}"#, Format::Json).unwrap();
        let rendered = render(&doc, Format::Json).unwrap();
        insta::assert_snapshot!(rendered.trim_end(), @r###"
        {
          "a": {
            "b": "c"
          }
        }
        "###);
    }

    #[test]
    fn test_render_yaml_round_trips() {
        let doc = parse_str("a:\n  - x\n  - y\nb: z\n", Format::Yaml).unwrap();
        let rendered = render(&doc, Format::Yaml).unwrap();
        assert_eq!(parse_str(&rendered, Format::Yaml).unwrap(), doc);
    }

    #[test]
    fn test_render_toml_round_trips_tables() {
        let doc = parse_str("name = \"x\"\n[server]\nport = \"8080\"\n", Format::Toml).unwrap();
        let rendered = render(&doc, Format::Toml).unwrap();
        assert_eq!(parse_str(&rendered, Format::Toml).unwrap(), doc);
    }

    #[test]
    fn test_render_toml_rejects_sequence_root() {
        let doc = parse_str("[1, 2]", Format::Json).unwrap();
        let err = render(&doc, Format::Toml).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }
}
