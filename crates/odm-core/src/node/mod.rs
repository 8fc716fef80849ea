//! Seam between the pipeline and a processing node.
//!
//! [`RemoteNode`] is the one place where wire traffic happens; everything in this
//! crate drives it through `Arc<dyn RemoteNode>` so tests can script a node.

use std::{path::Path, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::Value;

use odm_model::{NodeAddress, NodeInfo, ProcessingOptions, TaskId, TaskSnapshot};

mod error;
pub use error::NodeError;

#[async_trait]
pub trait RemoteNode: Send + Sync {
    /// Address the node was opened with.
    fn address(&self) -> &NodeAddress;

    async fn info(&self) -> Result<NodeInfo, NodeError>;

    /// Ids of every task the node knows about, whatever their state.
    async fn task_list(&self) -> Result<Vec<TaskId>, NodeError>;

    /// Raw status payload of one task. Normalize with [`TaskSnapshot::from_payload`].
    async fn task_info(&self, id: &TaskId) -> Result<Value, NodeError>;

    /// Create a task that accepts uploads. Processing starts on [`RemoteNode::commit`].
    async fn init_task(&self, name: &str, options: &ProcessingOptions)
    -> Result<TaskId, NodeError>;

    async fn upload(&self, id: &TaskId, file: &Path) -> Result<(), NodeError>;

    async fn commit(&self, id: &TaskId) -> Result<(), NodeError>;

    /// Fetch the task's full asset bundle and unpack it into `dest`.
    async fn download_assets(&self, id: &TaskId, dest: &Path) -> Result<(), NodeError>;
}

pub type NodeRef = Arc<dyn RemoteNode>;

/// Opens node handles by address.
pub trait NodeProvider: Send + Sync {
    /// `timeout` bounds every control request made through the returned handle.
    /// Uploads and downloads are not bounded by it.
    fn open(&self, address: &NodeAddress, timeout: Duration) -> Result<NodeRef, NodeError>;
}

/// A task created on a specific node.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    node: NodeRef,
}

impl TaskHandle {
    #[inline]
    pub fn new(id: TaskId, node: NodeRef) -> Self {
        Self { id, node }
    }

    #[inline]
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    #[inline]
    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    #[inline]
    pub fn address(&self) -> &NodeAddress {
        self.node.address()
    }

    pub async fn snapshot(&self) -> Result<TaskSnapshot, NodeError> {
        self.node
            .task_info(&self.id)
            .await
            .map(TaskSnapshot::from_payload)
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("node", self.node.address())
            .finish()
    }
}
