//! # Error Suggestions
//!
//! Turns library errors into messages that say what went wrong and how to
//! fix it. Commands call [`explain`] on the way out so every failure the
//! operator sees carries a `hint:` line where one is useful.
//!
//! ```rust,ignore
//! use keyport::suggestions;
//!
//! let document = format::load(&path, format).map_err(suggestions::explain)?;
//! ```

use crate::error::Error;

/// Format names accepted by `--format`.
const FORMAT_NAMES: [&str; 4] = ["json", "yaml", "yml", "toml"];

/// Convert a library error into an `anyhow` error with hints attached.
pub fn explain(error: Error) -> anyhow::Error {
    let hints: &[&str] = match &error {
        Error::Network { .. } => &[
            "hint: Check that the store is running and reachable",
            "hint: Use --peers or KEYPORT_PEERS to point at other endpoints",
            "hint: Raise --timeout / --command-timeout on slow links",
        ],
        Error::NotADirectory { .. } => &[
            "hint: The destination holds a single value, not a directory",
            "hint: Pick another destination or remove the value first",
        ],
        Error::KeyNotFound { .. } => &["hint: Run 'keyport tree /' to see what exists"],
        Error::DocumentParse { .. } => {
            &["hint: Check that --format (or KEYPORT_FORMAT) matches the file's contents"]
        }
        Error::InvalidDocument { .. } => {
            &[
                "hint: The top level of the file must be an object or a list",
                "hint: Keys must not be empty, '.' or '..', nor contain empty path segments",
            ]
        }
        Error::Prompt { .. } => &[
            "hint: Pipe 'yes' or 'no' on stdin when running non-interactively",
            "hint: Use --yes to merge without asking",
        ],
        _ => &[],
    };

    if hints.is_empty() {
        anyhow::Error::new(error)
    } else {
        anyhow::anyhow!("{}\n\n{}", error, hints.join("\n"))
    }
}

/// Message for a `--format` value keyport does not understand.
pub fn unsupported_format(format: &str) -> String {
    let did_you_mean = find_similar(&format.to_ascii_lowercase(), &FORMAT_NAMES)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    format!(
        "unsupported format '{format}'{did_you_mean}\n\
         hint: Supported formats are: {}",
        FORMAT_NAMES.join(", ")
    )
}

/// Find a similar string from a list of candidates (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            (distance <= 2 && distance < input.len()).then_some((candidate, distance))
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein distance, computed with a single rolling row.
fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, a_char) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let substitution = diagonal + usize::from(a_char != *b_char);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b_chars.len()]
}
