//! etcd v2 keys API client.
//!
//! Requests go to `<peer>/v2/keys/<path>`:
//!
//! | operation | request |
//! |---|---|
//! | get | `GET [?recursive=true]` |
//! | set leaf | `PUT` form `value=<v>` |
//! | set directory | `PUT` form `dir=true` |
//! | delete | `DELETE [?recursive=true]` |
//!
//! Error responses carry a JSON body `{errorCode, message, cause}`; code 100
//! becomes [`Error::KeyNotFound`], everything else [`Error::Store`].
//!
//! Peers are tried in order. Only a failure to connect moves on to the next
//! peer; a timeout or any response from a peer is final.

use super::{DeleteOptions, GetOptions, KeyValueStore, Node, SetOptions, KEY_NOT_FOUND};
use crate::config::{Credentials, Settings};
use crate::error::{Error, Result};
use crate::path;
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde::Deserialize;
use std::fs;
use url::Url;

/// Successful response body.
#[derive(Debug, Deserialize)]
struct KeysResponse {
    node: Node,
}

/// Error response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeysError {
    error_code: u64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    cause: Option<String>,
}

/// Store client for servers speaking the etcd v2 keys protocol
pub struct EtcdStore {
    peers: Vec<Url>,
    credentials: Option<Credentials>,
    client: Client,
}

impl std::fmt::Debug for EtcdStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtcdStore")
            .field("peers", &self.peers)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl EtcdStore {
    /// Build a client from resolved settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        if settings.peers.is_empty() {
            return Err(Error::ConfigParse {
                message: "no peers configured".to_string(),
                hint: Some("Pass --peers http://127.0.0.1:2379".to_string()),
            });
        }

        let mut builder = Client::builder()
            .connect_timeout(settings.timeout)
            .timeout(settings.command_timeout);

        if let Some(ca) = &settings.tls.ca {
            let pem = fs::read(ca)?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| tls_error("ca", e))?;
            builder = builder.add_root_certificate(cert);
        }
        if let (Some(cert), Some(key)) = (&settings.tls.cert, &settings.tls.key) {
            let mut pem = fs::read(cert)?;
            pem.extend(fs::read(key)?);
            let identity = reqwest::Identity::from_pem(&pem).map_err(|e| tls_error("cert", e))?;
            builder = builder.identity(identity);
        }

        let client = builder.build().map_err(|e| Error::ConfigParse {
            message: format!("failed to build HTTP client: {}", e),
            hint: None,
        })?;

        Ok(Self {
            peers: settings.peers.clone(),
            credentials: settings.credentials.clone(),
            client,
        })
    }

    /// The endpoints this client talks to, in failover order.
    pub fn peers(&self) -> &[Url] {
        &self.peers
    }

    fn keys_url(peer: &Url, key: &str) -> Result<Url> {
        let mut url = peer.clone();
        url.set_query(None);
        {
            let mut segments = url.path_segments_mut().map_err(|_| Error::Network {
                url: peer.to_string(),
                message: "peer URL cannot carry a path".to_string(),
            })?;
            segments.pop_if_empty().push("v2").push("keys");
            segments.extend(path::segments(key));
        }
        Ok(url)
    }

    /// Send one request, failing over between peers on connection errors,
    /// and return the status and body of the first peer that answered.
    fn send(
        &self,
        method: Method,
        key: &str,
        build: impl Fn(RequestBuilder) -> RequestBuilder,
    ) -> Result<(reqwest::StatusCode, String)> {
        let mut last_error = None;

        for peer in &self.peers {
            let url = Self::keys_url(peer, key)?;
            debug!("{} {}", method, url);

            let mut request = self.client.request(method.clone(), url.clone());
            if let Some(creds) = &self.credentials {
                request = request.basic_auth(&creds.username, creds.password.as_ref());
            }

            match build(request).send() {
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().map_err(|e| Error::Network {
                        url: url.to_string(),
                        message: format!("failed to read response: {}", e),
                    })?;
                    return Ok((status, body));
                }
                Err(e) if e.is_connect() => {
                    warn!("Peer {} unreachable: {}", peer, e);
                    last_error = Some(Error::Network {
                        url: url.to_string(),
                        message: format!("connect error: {}", e),
                    });
                }
                Err(e) => {
                    let kind = if e.is_timeout() { "timeout" } else { "request" };
                    return Err(Error::Network {
                        url: url.to_string(),
                        message: format!("{} error: {}", kind, e),
                    });
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Network {
            url: String::new(),
            message: "no peers configured".to_string(),
        }))
    }

    /// Convert a non-success response into the matching error.
    fn response_error(key: &str, status: reqwest::StatusCode, body: &str) -> Error {
        match serde_json::from_str::<KeysError>(body) {
            Ok(err) if err.error_code == KEY_NOT_FOUND => Error::KeyNotFound {
                path: key.to_string(),
            },
            Ok(err) => Error::Store {
                path: key.to_string(),
                code: Some(err.error_code),
                message: match err.cause {
                    Some(cause) if !cause.is_empty() => format!("{} ({})", err.message, cause),
                    _ => err.message,
                },
            },
            Err(_) => Error::Store {
                path: key.to_string(),
                code: None,
                message: format!("HTTP {}: {}", status, body.trim()),
            },
        }
    }

    fn expect_success(key: &str, status: reqwest::StatusCode, body: &str) -> Result<()> {
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::response_error(key, status, body))
        }
    }
}

fn tls_error(what: &str, e: reqwest::Error) -> Error {
    Error::ConfigParse {
        message: format!("invalid {} PEM: {}", what, e),
        hint: Some("Check the 'ca', 'cert' and 'key' paths in the settings file".to_string()),
    }
}

impl KeyValueStore for EtcdStore {
    fn get(&self, key: &str, options: GetOptions) -> Result<Node> {
        let (status, body) = self.send(Method::GET, key, |req| {
            if options.recursive {
                req.query(&[("recursive", "true")])
            } else {
                req
            }
        })?;
        Self::expect_success(key, status, &body)?;

        let response: KeysResponse = serde_json::from_str(&body).map_err(|e| Error::Store {
            path: key.to_string(),
            code: None,
            message: format!("malformed response: {}", e),
        })?;
        Ok(response.node)
    }

    fn set(&self, key: &str, value: &str, options: SetOptions) -> Result<()> {
        let (status, body) = self.send(Method::PUT, key, |req| {
            if options.dir {
                req.form(&[("dir", "true")])
            } else {
                req.form(&[("value", value)])
            }
        })?;
        Self::expect_success(key, status, &body)
    }

    fn delete(&self, key: &str, options: DeleteOptions) -> Result<()> {
        let (status, body) = self.send(Method::DELETE, key, |req| {
            if options.recursive {
                req.query(&[("recursive", "true")])
            } else {
                req
            }
        })?;
        Self::expect_success(key, status, &body)
    }
}
