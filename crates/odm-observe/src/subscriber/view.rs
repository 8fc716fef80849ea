use std::borrow::Borrow;

use odm_core::{Event, EventKind};
use tracing::{debug, info, warn};

pub trait View {
    fn as_task(&self) -> &str;
    fn as_node(&self) -> &str;
    fn as_reason(&self) -> &str;
    fn as_status(&self) -> &str;
    fn percent(&self) -> u8;
    fn count(&self) -> usize;
    fn attempt(&self) -> u32;
    fn max_attempts(&self) -> u32;
    fn delay_ms(&self) -> u64;
    fn kind(&self) -> EventKind;
}

impl<T> View for T
where
    T: Borrow<Event>,
{
    #[inline]
    fn as_task(&self) -> &str {
        self.borrow().task.as_ref().map_or("unknown", |t| t.as_str())
    }
    #[inline]
    fn as_node(&self) -> &str {
        self.borrow().node.as_ref().map_or("unknown", |n| n.as_str())
    }
    #[inline]
    fn as_reason(&self) -> &str {
        self.borrow().reason.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn as_status(&self) -> &str {
        self.borrow().status.map_or("UNKNOWN", |s| s.as_str())
    }
    #[inline]
    fn percent(&self) -> u8 {
        self.borrow().percent.unwrap_or(0)
    }
    #[inline]
    fn count(&self) -> usize {
        self.borrow().count.unwrap_or(0)
    }
    #[inline]
    fn attempt(&self) -> u32 {
        self.borrow().attempt.unwrap_or(0)
    }
    #[inline]
    fn max_attempts(&self) -> u32 {
        self.borrow().max_attempts.unwrap_or(0)
    }
    #[inline]
    fn delay_ms(&self) -> u64 {
        self.borrow().delay_ms.unwrap_or(0)
    }
    #[inline]
    fn kind(&self) -> EventKind {
        self.borrow().kind
    }
}

#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        // selection
        EventKind::NodeProbed => "node probed",
        EventKind::NodeUnreachable => "node unreachable; excluded from selection",
        EventKind::NodeSelected => "node selected",

        // submission
        EventKind::TaskInitialized => "task initialized on node",
        EventKind::UploadProgress => "uploading images",
        EventKind::TaskCommitted => "task committed; processing starts",

        // monitoring
        EventKind::TaskProgress => "task progress",
        EventKind::ConnectionRetry => "connection error while polling; retrying",
        EventKind::TaskCompleted => "task completed",
        EventKind::TaskEnded => "task ended without completing",

        // retrieval
        EventKind::AssetsDownloaded => "task assets downloaded",

        // local stages
        EventKind::FramesExtracted => "frames extracted",
        EventKind::ResultsCurated => "key results copied",
    }
}

#[inline]
pub fn log_event<E: View>(e: E) {
    let msg = message_for(e.kind());

    match e.kind() {
        // selection
        EventKind::NodeProbed => debug!(node = e.as_node(), "{msg}"),
        EventKind::NodeUnreachable => {
            warn!(node = e.as_node(), reason = e.as_reason(), "{msg}")
        }
        EventKind::NodeSelected => info!(node = e.as_node(), "{msg}"),

        // submission
        EventKind::TaskInitialized => {
            info!(task = e.as_task(), node = e.as_node(), "{msg}")
        }
        EventKind::UploadProgress => {
            info!(task = e.as_task(), pct = e.percent(), done = e.count(), "{msg}")
        }
        EventKind::TaskCommitted => {
            info!(task = e.as_task(), images = e.count(), "{msg}")
        }

        // monitoring
        EventKind::TaskProgress => {
            info!(task = e.as_task(), status = e.as_status(), pct = e.percent(), "{msg}")
        }
        EventKind::ConnectionRetry => warn!(
            task = e.as_task(),
            attempt = e.attempt(),
            max = e.max_attempts(),
            delay_ms = e.delay_ms(),
            reason = e.as_reason(),
            "{msg}"
        ),
        EventKind::TaskCompleted => info!(task = e.as_task(), "{msg}"),
        EventKind::TaskEnded => warn!(
            task = e.as_task(),
            status = e.as_status(),
            pct = e.percent(),
            reason = e.as_reason(),
            "{msg}"
        ),

        // retrieval
        EventKind::AssetsDownloaded => info!(task = e.as_task(), "{msg}"),

        // local stages
        EventKind::FramesExtracted => info!(frames = e.count(), "{msg}"),
        EventKind::ResultsCurated => info!(files = e.count(), "{msg}"),
    }
}
