use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Port NodeODM listens on when an address does not name one.
pub const DEFAULT_NODE_PORT: u16 = 3000;

const DEFAULT_SCHEME: &str = "http";

/// Address of a remote processing node as it was configured.
///
/// Kept as the raw (trimmed) string; parsing into an [`Endpoint`] happens on demand,
/// so a malformed entry only fails the operation that actually needs to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAddress(String);

impl NodeAddress {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the address into scheme, host and port.
    ///
    /// Accepted forms:
    /// - `http://nodeodm:3000`
    /// - `https://127.0.0.1:3000`
    /// - `nodeodm:3000`
    /// - `nodeodm` (port defaults to [`DEFAULT_NODE_PORT`])
    pub fn endpoint(&self) -> ModelResult<Endpoint> {
        let s = self.0.as_str();

        let (scheme, rest) = match s.split_once("://") {
            Some((scheme, rest)) if !scheme.is_empty() => (scheme.to_ascii_lowercase(), rest),
            Some((_, rest)) => (DEFAULT_SCHEME.to_string(), rest),
            None => (DEFAULT_SCHEME.to_string(), s),
        };
        let has_scheme = s.contains("://");

        // Drop any path/query and userinfo; only the authority matters here.
        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        let authority = authority.rsplit('@').next().unwrap_or_default();

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    ModelError::InvalidAddress(format!("{s}: invalid port '{port}'"))
                })?;
                (host, port)
            }
            None => (authority, DEFAULT_NODE_PORT),
        };

        let host = if host.is_empty() {
            if !has_scheme {
                return Err(ModelError::InvalidAddress(format!("{s}: missing host")));
            }
            "localhost".to_string()
        } else {
            host.to_string()
        };

        Ok(Endpoint { scheme, host, port })
    }

    /// Normalized `scheme://host:port` form used to build request URLs.
    pub fn base_url(&self) -> ModelResult<String> {
        Ok(self.endpoint()?.base_url())
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeAddress {
    fn from(value: &str) -> Self {
        NodeAddress::new(value)
    }
}

impl From<String> for NodeAddress {
    fn from(value: String) -> Self {
        NodeAddress::new(value)
    }
}

/// Parsed form of a [`NodeAddress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}
