use reqwest::StatusCode;
use thiserror::Error;

use odm_core::NodeError;
use odm_model::ModelError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("node rejected request: {0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid node address: {0}")]
    Address(#[from] ModelError),

    #[error("asset archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ClientError> for NodeError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::HttpRequest(e) => classify(&e),
            ClientError::Rejected(msg) => NodeError::Rejected(msg),
            ClientError::NotFound(msg) => NodeError::NotFound(msg),
            e @ ClientError::Status { .. } => NodeError::InvalidResponse(e.to_string()),
            ClientError::InvalidResponse(msg) => NodeError::InvalidResponse(msg),
            ClientError::Address(e) => NodeError::Address(e.to_string()),
            e @ (ClientError::Archive(_) | ClientError::Io(_)) => NodeError::Io(e.to_string()),
        }
    }
}

fn classify(e: &reqwest::Error) -> NodeError {
    if e.is_decode() {
        return NodeError::InvalidResponse(e.to_string());
    }
    match e.status() {
        Some(StatusCode::NOT_FOUND) => NodeError::NotFound(e.to_string()),
        Some(_) => NodeError::InvalidResponse(e.to_string()),
        // connect, timeout, reset mid-body: the node is not reachable right now
        None => NodeError::Connection(e.to_string()),
    }
}
