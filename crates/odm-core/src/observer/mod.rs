//! Progress events emitted by the pipeline stages.
//!
//! Stages never print. They hand an [`Event`] to an [`Observer`] and move on;
//! rendering (log lines, progress bars) is the observer's business.

use std::sync::Mutex;

use odm_model::{LoadSample, NodeAddress, TaskId, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // selection
    NodeProbed,
    NodeUnreachable,
    NodeSelected,

    // submission
    TaskInitialized,
    UploadProgress,
    TaskCommitted,

    // monitoring
    TaskProgress,
    ConnectionRetry,
    TaskCompleted,
    TaskEnded,

    // retrieval
    AssetsDownloaded,

    // local stages
    FramesExtracted,
    ResultsCurated,
}

/// One progress notification. Only the fields relevant to `kind` are set.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub node: Option<NodeAddress>,
    pub task: Option<TaskId>,
    pub status: Option<TaskStatus>,
    pub load: Option<LoadSample>,
    pub percent: Option<u8>,
    pub count: Option<usize>,
    pub attempt: Option<u32>,
    pub max_attempts: Option<u32>,
    pub delay_ms: Option<u64>,
    pub reason: Option<String>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            node: None,
            task: None,
            status: None,
            load: None,
            percent: None,
            count: None,
            attempt: None,
            max_attempts: None,
            delay_ms: None,
            reason: None,
        }
    }

    #[inline]
    pub fn with_node(mut self, node: &NodeAddress) -> Self {
        self.node = Some(node.clone());
        self
    }

    #[inline]
    pub fn with_task(mut self, task: &TaskId) -> Self {
        self.task = Some(task.clone());
        self
    }

    #[inline]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[inline]
    pub fn with_load(mut self, load: LoadSample) -> Self {
        self.load = Some(load);
        self
    }

    #[inline]
    pub fn with_percent(mut self, percent: u8) -> Self {
        self.percent = Some(percent);
        self
    }

    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    #[inline]
    pub fn with_attempt(mut self, attempt: u32, max_attempts: u32) -> Self {
        self.attempt = Some(attempt);
        self.max_attempts = Some(max_attempts);
        self
    }

    #[inline]
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

pub trait Observer: Send + Sync {
    fn on_event(&self, event: &Event);

    fn name(&self) -> &'static str {
        "observer"
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    #[inline]
    fn on_event(&self, _event: &Event) {}

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events of one kind, in emission order.
    pub fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.kind == kind)
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
