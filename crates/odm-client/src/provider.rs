use std::time::Duration;

use odm_core::{NodeError, NodeProvider, NodeRef};
use odm_model::NodeAddress;

use crate::{client::NodeClient, config::ClientConfig, errors::ClientError};

/// Opens [`NodeClient`]s that share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpNodeProvider {
    http: reqwest::Client,
}

impl HttpNodeProvider {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { http })
    }
}

impl NodeProvider for HttpNodeProvider {
    fn open(&self, address: &NodeAddress, timeout: Duration) -> Result<NodeRef, NodeError> {
        let client = NodeClient::with_http(address.clone(), self.http.clone(), timeout)?;
        Ok(std::sync::Arc::new(client))
    }
}
