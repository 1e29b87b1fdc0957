//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let etcd = FakeEtcd::start(MemoryStore::new());
//!     let fixture = TestFixture::new().with_file("doc.json", documents::SERVICE_JSON);
//!     fixture
//!         .command_for(&etcd)
//!         .args(["import", "/app", "doc.json"])
//!         .assert()
//!         .success();
//! }
//! ```

use assert_fs::prelude::*;
use keyport::error::Error;
use keyport::store::{DeleteOptions, GetOptions, KeyValueStore, MemoryStore, Node, SetOptions};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::Arc;
use std::thread;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    #[allow(unused_imports)]
    pub use keyport::store::MemoryStore;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::documents;
    #[allow(unused_imports)]
    pub use super::unreachable_peer;
    #[allow(unused_imports)]
    pub use super::FakeEtcd;
    pub use super::TestFixture;
}

/// Document snippets used across tests.
#[allow(dead_code)]
pub mod documents {
    /// The service configuration used in the README walkthrough.
    pub const SERVICE_JSON: &str = r#"{
  "db": {"host": "db1", "port": 5432},
  "replicas": ["r1", "r2"]
}"#;

    /// The same data as YAML.
    pub const SERVICE_YAML: &str = "db:\n  host: db1\n  port: 5432\nreplicas:\n  - r1\n  - r2\n";

    /// The same data as TOML.
    pub const SERVICE_TOML: &str = "replicas = [\"r1\", \"r2\"]\n\n[db]\nhost = \"db1\"\nport = 5432\n";

    /// Not valid in any supported format.
    pub const INVALID: &str = "{ this is: [not valid";

    /// Valid JSON whose root cannot become a directory.
    pub const SCALAR_ROOT: &str = "\"just a string\"";
}

/// A peer address nothing listens on, for "store unreachable" tests.
#[allow(dead_code)]
pub fn unreachable_peer() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    drop(listener);
    format!("http://{}", addr)
}

/// A minimal etcd v2 keys API served from a [`MemoryStore`].
///
/// Each connection carries exactly one request. The server thread lives
/// until the test process exits.
#[allow(dead_code)]
pub struct FakeEtcd {
    url: String,
    store: Arc<MemoryStore>,
}

#[allow(dead_code)]
impl FakeEtcd {
    pub fn start(store: MemoryStore) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind fake etcd");
        let url = format!("http://{}", listener.local_addr().expect("No local address"));
        let store = Arc::new(store);

        let served = Arc::clone(&store);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                handle(stream, &served);
            }
        });

        Self { url, store }
    }

    /// Base URL to pass as `--peers`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The backing store, for assertions.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

fn handle(mut stream: TcpStream, store: &MemoryStore) {
    let Ok(clone) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(clone);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut content_length = 0;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).unwrap_or(0) == 0 || header == "\r\n" {
            break;
        }
        let lower = header.to_ascii_lowercase();
        if let Some(value) = lower.strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }
    let mut body = vec![0; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let target = parts.next().unwrap_or_default();
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let key = path.strip_prefix("/v2/keys").unwrap_or(path);
    let flag = |pairs: &[u8], name: &str| {
        url::form_urlencoded::parse(pairs).any(|(k, v)| k == name && v == "true")
    };

    let (status, response) = match method {
        "GET" => respond(
            store
                .get(key, GetOptions { recursive: flag(query.as_bytes(), "recursive") })
                .map(|node| json!({"action": "get", "node": node_json(&node)})),
        ),
        "PUT" => {
            let form: Vec<(String, String)> = url::form_urlencoded::parse(&body)
                .into_owned()
                .collect();
            let dir = form.iter().any(|(k, v)| k == "dir" && v == "true");
            let value = form
                .iter()
                .find(|(k, _)| k == "value")
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            respond(
                store
                    .set(key, &value, SetOptions { dir })
                    .map(|_| json!({"action": "set", "node": {"key": key}})),
            )
        }
        "DELETE" => respond(
            store
                .delete(key, DeleteOptions { recursive: flag(query.as_bytes(), "recursive") })
                .map(|_| json!({"action": "delete", "node": {"key": key}})),
        ),
        _ => (405, json!({"errorCode": 0, "message": "method not allowed"})),
    };

    let body = response.to_string();
    let _ = write!(
        stream,
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
}

fn respond(result: keyport::error::Result<Value>) -> (u16, Value) {
    match result {
        Ok(value) => (200, value),
        Err(Error::KeyNotFound { path }) => (
            404,
            json!({"errorCode": 100, "message": "Key not found", "cause": path}),
        ),
        Err(Error::Store {
            path,
            code: Some(code),
            message,
        }) => (
            403,
            json!({"errorCode": code, "message": message, "cause": path}),
        ),
        Err(other) => (500, json!({"errorCode": 300, "message": other.to_string()})),
    }
}

fn node_json(node: &Node) -> Value {
    if node.dir {
        let mut value = json!({"key": node.key, "dir": true});
        if !node.nodes.is_empty() {
            value["nodes"] = node.nodes.iter().map(node_json).collect();
        }
        value
    } else {
        json!({"key": node.key, "value": node.value})
    }
}

/// A temporary working directory with input files.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A `keyport` command running in this directory, isolated from the
    /// user's settings and environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("keyport");
        cmd.current_dir(self.path())
            .env_remove("KEYPORT_PEERS")
            .env_remove("KEYPORT_FORMAT")
            .env_remove("KEYPORT_USER")
            .env("KEYPORT_CONFIG", self.settings_path())
            .env("NO_COLOR", "1");
        cmd
    }

    /// A command pointed at the given fake store.
    #[allow(dead_code)]
    pub fn command_for(&self, etcd: &FakeEtcd) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("--peers").arg(etcd.url());
        cmd
    }

    fn settings_path(&self) -> std::path::PathBuf {
        let path = self.temp_dir.path().join("keyport.toml");
        if !path.exists() {
            std::fs::write(&path, "").expect("Failed to write settings file");
        }
        path
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("doc.json", documents::SERVICE_JSON);
        assert!(fixture.path().join("doc.json").exists());
    }

    #[test]
    fn test_documents_parse() {
        serde_json::from_str::<Value>(documents::SERVICE_JSON).expect("valid JSON");
        serde_yaml::from_str::<serde_yaml::Value>(documents::SERVICE_YAML).expect("valid YAML");
        toml::from_str::<toml::Value>(documents::SERVICE_TOML).expect("valid TOML");
        assert!(serde_json::from_str::<Value>(documents::INVALID).is_err());
    }

    #[test]
    fn test_node_json_shapes() {
        let node = Node::directory("/a", vec![Node::leaf("/a/b", "1")]);
        assert_eq!(
            node_json(&node),
            json!({"key": "/a", "dir": true, "nodes": [{"key": "/a/b", "value": "1"}]})
        );
    }
}
