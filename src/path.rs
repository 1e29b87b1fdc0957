//! Store path utilities
//!
//! Store paths are slash-delimited, always absolute, and never end in a slash
//! unless they name the root (`/`).

/// Normalize a user-supplied store path.
///
/// Adds the leading slash when missing, collapses repeated slashes and drops a
/// trailing slash. An empty input names the root.
pub fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

/// Append a child segment to a normalized base path.
pub fn join(base: &str, child: &str) -> String {
    if base == "/" {
        format!("/{}", child)
    } else {
        format!("{}/{}", base, child)
    }
}

/// Split a normalized path into its segments (the root has none).
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Last segment of a path, or `/` for the root.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("/")
}

/// Path of `path` relative to `base`, without a leading slash.
///
/// Returns `None` when `path` is not `base` itself or a descendant of it.
pub fn relative_to<'a>(base: &str, path: &'a str) -> Option<&'a str> {
    if base == "/" {
        return Some(path.trim_start_matches('/'));
    }
    let rest = path.strip_prefix(base)?;
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/app/config/"), "/app/config");
        assert_eq!(normalize("app/config"), "/app/config");
        assert_eq!(normalize("//app///config"), "/app/config");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "app"), "/app");
        assert_eq!(join("/app", "db"), "/app/db");
        assert_eq!(join("/app/replicas", "0"), "/app/replicas/0");
    }

    #[test]
    fn test_segments_and_file_name() {
        assert_eq!(segments("/app/db/host"), vec!["app", "db", "host"]);
        assert!(segments("/").is_empty());
        assert_eq!(file_name("/app/db/host"), "host");
        assert_eq!(file_name("/"), "/");
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(relative_to("/app", "/app/db/host"), Some("db/host"));
        assert_eq!(relative_to("/app", "/app"), Some(""));
        assert_eq!(relative_to("/app", "/application"), None);
        assert_eq!(relative_to("/app", "/other"), None);
        assert_eq!(relative_to("/", "/app/db"), Some("app/db"));
    }
}
