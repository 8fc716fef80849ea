use std::path::PathBuf;

use thiserror::Error;

use odm_core::{MonitorError, NodeError, RetrieveError, SelectError, SubmitError};
use odm_exec::ExecError;

use crate::config::ConfigError;

/// Failure of one pipeline run. Stage errors pass through unchanged.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("video not found: {}", .0.display())]
    VideoNotFound(PathBuf),
    #[error("invalid run id: {0}")]
    InvalidRunId(String),
    #[error("invalid frame parameters: {0}")]
    InvalidParams(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot hash video {}: {reason}", .path.display())]
    Hash { path: PathBuf, reason: String },
    #[error("cannot prepare {}: {reason}", .path.display())]
    Layout { path: PathBuf, reason: String },
    #[error("frame extraction failed: {0}")]
    Extract(#[from] ExecError),
    #[error("node selection failed: {0}")]
    Select(#[from] SelectError),
    #[error("cannot connect to node: {0}")]
    Connect(#[from] NodeError),
    #[error("task submission failed: {0}")]
    Submit(#[from] SubmitError),
    #[error("task monitoring failed: {0}")]
    Monitor(#[from] MonitorError),
    #[error("asset retrieval failed: {0}")]
    Retrieve(#[from] RetrieveError),
    #[error("cannot copy key outputs to {}: {reason}", .path.display())]
    Curate { path: PathBuf, reason: String },
}
