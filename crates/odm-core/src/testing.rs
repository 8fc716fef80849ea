//! Scripted in-memory node for stage tests.

use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    Layer,
};

use odm_model::{NodeAddress, NodeInfo, ProcessingOptions, TaskId};

use crate::node::{NodeError, NodeProvider, NodeRef, RemoteNode};

/// Counts `INFO`, `WARN` and `ERROR` lines emitted on the current thread while this value lives.
pub(crate) struct LoudLines {
    pub count: Arc<AtomicUsize>,
    _guard: tracing::subscriber::DefaultGuard,
}

impl LoudLines {
    pub fn capture() -> Self {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(CountAtInfo(count.clone()));
        Self {
            count,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    pub fn seen(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

struct CountAtInfo(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for CountAtInfo {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() <= tracing::Level::INFO {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub(crate) fn status(code: i64, progress: u8) -> Value {
    json!({ "status": { "code": code }, "progress": progress })
}

pub(crate) fn conn_err() -> NodeError {
    NodeError::Connection("connection refused".into())
}

pub(crate) struct FakeNode {
    address: NodeAddress,
    tasks: Result<Vec<TaskId>, NodeError>,
    infos: HashMap<TaskId, Result<Value, NodeError>>,
    script: Mutex<VecDeque<Result<Value, NodeError>>>,
    list_delay: Option<Duration>,
    fail_upload: Option<String>,
    fail_info: bool,

    pub polls: AtomicUsize,
    pub uploads: Mutex<Vec<PathBuf>>,
    pub init_options: Mutex<Option<ProcessingOptions>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub committed: AtomicBool,
    pub downloads: AtomicUsize,
}

impl FakeNode {
    pub fn new(address: &str) -> Self {
        Self {
            address: NodeAddress::new(address),
            tasks: Ok(Vec::new()),
            infos: HashMap::new(),
            script: Mutex::new(VecDeque::new()),
            list_delay: None,
            fail_upload: None,
            fail_info: false,
            polls: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
            init_options: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            committed: AtomicBool::new(false),
            downloads: AtomicUsize::new(0),
        }
    }

    /// Node whose tasks are `running` running ones followed by `queued` queued ones.
    pub fn with_load(mut self, running: usize, queued: usize) -> Self {
        let mut tasks = Vec::new();
        for i in 0..running + queued {
            let id = TaskId::from(format!("t{i}"));
            let code = if i < running { 20 } else { 10 };
            self.infos.insert(id.clone(), Ok(status(code, 0)));
            tasks.push(id);
        }
        self.tasks = Ok(tasks);
        self
    }

    pub fn with_task(mut self, id: &str, info: Result<Value, NodeError>) -> Self {
        let id = TaskId::from(id);
        if let Ok(tasks) = &mut self.tasks {
            tasks.push(id.clone());
        }
        self.infos.insert(id, info);
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.tasks = Err(conn_err());
        self.fail_info = true;
        self
    }

    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub fn failing_upload(mut self, file_name: &str) -> Self {
        self.fail_upload = Some(file_name.to_string());
        self
    }

    /// Replies served, in order, to `task_info` before falling back to the static map.
    pub fn with_script(self, replies: impl IntoIterator<Item = Result<Value, NodeError>>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.extend(replies);
        }
        self
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }
}

#[async_trait]
impl RemoteNode for FakeNode {
    fn address(&self) -> &NodeAddress {
        &self.address
    }

    async fn info(&self) -> Result<NodeInfo, NodeError> {
        if self.fail_info {
            return Err(conn_err());
        }
        Ok(NodeInfo {
            version: Some("2.2.0".into()),
            engine: Some("odm".into()),
            ..Default::default()
        })
    }

    async fn task_list(&self) -> Result<Vec<TaskId>, NodeError> {
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        self.tasks.clone()
    }

    async fn task_info(&self, id: &TaskId) -> Result<Value, NodeError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        if let Some(reply) = scripted {
            return reply;
        }
        self.infos
            .get(id)
            .cloned()
            .unwrap_or_else(|| Err(NodeError::NotFound(format!("task {id}"))))
    }

    async fn init_task(
        &self,
        _name: &str,
        options: &ProcessingOptions,
    ) -> Result<TaskId, NodeError> {
        if let Ok(mut slot) = self.init_options.lock() {
            *slot = Some(options.clone());
        }
        Ok(TaskId::from("task-1"))
    }

    async fn upload(&self, _id: &TaskId, file: &Path) -> Result<(), NodeError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if self.fail_upload.as_deref() == Some(name) {
            return Err(NodeError::Rejected(format!("cannot store {name}")));
        }
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push(file.to_path_buf());
        }
        Ok(())
    }

    async fn commit(&self, _id: &TaskId) -> Result<(), NodeError> {
        self.committed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn download_assets(&self, _id: &TaskId, dest: &Path) -> Result<(), NodeError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let dir = dest.join("odm_orthophoto");
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join("odm_orthophoto.tif"), b"tif")?;
        Ok(())
    }
}

/// Hands out registered fake nodes; unknown addresses fail to open.
#[derive(Default)]
pub(crate) struct FakeProvider {
    nodes: HashMap<NodeAddress, NodeRef>,
}

impl FakeProvider {
    pub fn with(mut self, node: FakeNode) -> Self {
        self.nodes.insert(node.address().clone(), node.into_ref());
        self
    }
}

impl NodeProvider for FakeProvider {
    fn open(&self, address: &NodeAddress, _timeout: Duration) -> Result<NodeRef, NodeError> {
        self.nodes
            .get(address)
            .cloned()
            .ok_or_else(|| NodeError::Connection(format!("no route to {address}")))
    }
}
