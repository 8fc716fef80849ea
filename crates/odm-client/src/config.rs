use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound on establishing a TCP/TLS connection.
    pub connect_timeout: Duration,
    /// Default bound on control requests (info, list, status, init, commit).
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            user_agent: concat!("odm-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
