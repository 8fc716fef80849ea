use thiserror::Error;

use odm_model::ModelError;

/// Failure of a single call against a remote node.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    /// Node unreachable: refused connection, DNS failure, timeout, reset.
    #[error("connection error: {0}")]
    Connection(String),
    /// Node answered that the task (or route) does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Node understood the request and refused it.
    #[error("rejected by node: {0}")]
    Rejected(String),
    /// Node answered with something that is not a valid reply.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid address: {0}")]
    Address(String),
    #[error("io error: {0}")]
    Io(String),
}

impl NodeError {
    /// Connectivity faults are the only ones worth retrying.
    #[inline]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, NodeError::Connection(_))
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, NodeError::NotFound(_))
    }
}

impl From<std::io::Error> for NodeError {
    fn from(e: std::io::Error) -> Self {
        NodeError::Io(e.to_string())
    }
}

impl From<ModelError> for NodeError {
    fn from(e: ModelError) -> Self {
        NodeError::Address(e.to_string())
    }
}
