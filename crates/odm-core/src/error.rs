use std::path::PathBuf;

use thiserror::Error;

use odm_model::{TaskId, TaskStatus};

use crate::node::NodeError;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe of {address} timed out after {timeout_ms} ms")]
    Timeout { address: String, timeout_ms: u64 },
    #[error("probe of {address} failed: {source}")]
    Node {
        address: String,
        #[source]
        source: NodeError,
    },
}

#[derive(Error, Debug)]
pub enum SelectError {
    #[error("no node addresses to select from")]
    NoAddresses,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("no input images to submit")]
    NoInputs,
    #[error("task init on {address} failed: {source}")]
    Init {
        address: String,
        #[source]
        source: NodeError,
    },
    #[error("upload of {} to task {id} failed: {source}", .file.display())]
    Upload {
        id: TaskId,
        file: PathBuf,
        #[source]
        source: NodeError,
    },
    #[error("commit of task {id} failed: {source}")]
    Commit {
        id: TaskId,
        #[source]
        source: NodeError,
    },
    #[error("cannot list images in {}: {reason}", .dir.display())]
    Inputs { dir: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error(
        "lost connection to the node while polling task {id} ({attempts} consecutive errors); \
         the node may have restarted without persisted task state: {source}"
    )]
    ConnectionLost {
        id: TaskId,
        attempts: u32,
        #[source]
        source: NodeError,
    },
    #[error(
        "node reports task {id} as not found; it was likely never persisted \
         or the node restarted without its task data: {source}"
    )]
    TaskNotFound {
        id: TaskId,
        #[source]
        source: NodeError,
    },
    #[error(
        "task {id} ended with status={status} progress={progress}% last_error={} info={info}",
        .last_error.as_deref().unwrap_or("none")
    )]
    TaskEnded {
        id: TaskId,
        status: TaskStatus,
        progress: u8,
        last_error: Option<String>,
        info: String,
    },
    #[error("polling task {id} failed: {source}")]
    Node {
        id: TaskId,
        #[source]
        source: NodeError,
    },
}

#[derive(Error, Debug)]
pub enum RetrieveError {
    #[error("cannot create {}: {reason}", .path.display())]
    CreateDir { path: PathBuf, reason: String },
    #[error("download of task {id} assets failed: {source}")]
    Download {
        id: TaskId,
        #[source]
        source: NodeError,
    },
}
