//! HTTP client for NodeODM processing nodes.

mod archive;
mod reply;

pub mod client;
pub use client::NodeClient;

pub mod config;
pub use config::ClientConfig;

pub mod errors;
pub use errors::ClientError;

pub mod provider;
pub use provider::HttpNodeProvider;
