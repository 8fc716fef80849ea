//! Polling state machine that waits for a remote task to finish.
//!
//! `QUEUED -> RUNNING -> {COMPLETED | FAILED | CANCELED}`. `UNKNOWN` is transient:
//! an unclassifiable payload is polled again. Connectivity faults are retried up to
//! a ceiling of consecutive errors; a missing task is fatal on first sight.

use std::time::Duration;

use tracing::debug;

use odm_model::{TaskId, TaskSnapshot, TaskStatus};

use crate::{
    error::MonitorError,
    node::TaskHandle,
    observer::{Event, EventKind, Observer},
};

pub const DEFAULT_MAX_CONNECTION_ERRORS: u32 = 30;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct Monitor {
    poll_interval: Duration,
    max_connection_errors: u32,
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Monitor {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            max_connection_errors: DEFAULT_MAX_CONNECTION_ERRORS,
        }
    }

    /// Consecutive connectivity faults tolerated before giving up. Clamped to at least 1.
    #[inline]
    pub fn with_max_connection_errors(mut self, max: u32) -> Self {
        self.max_connection_errors = max.max(1);
        self
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    #[inline]
    pub fn max_connection_errors(&self) -> u32 {
        self.max_connection_errors
    }

    /// Poll until the task reaches a terminal state.
    ///
    /// Returns the final snapshot on `COMPLETED`. Progress is reported once per distinct value.
    pub async fn wait(
        &self,
        handle: &TaskHandle,
        observer: &dyn Observer,
    ) -> Result<TaskSnapshot, MonitorError> {
        let id = handle.id();
        let delay_ms = self.poll_interval.as_millis() as u64;
        let mut consecutive_errors: u32 = 0;
        let mut last_progress: Option<u8> = None;

        debug!(target: "odm.core.monitor", task = %id, node = %handle.address(), delay_ms, "monitoring task");

        loop {
            let raw = match handle.node().task_info(id).await {
                Ok(raw) => raw,
                Err(e) if e.is_connectivity() => {
                    consecutive_errors += 1;
                    if consecutive_errors >= self.max_connection_errors {
                        return Err(MonitorError::ConnectionLost {
                            id: id.clone(),
                            attempts: consecutive_errors,
                            source: e,
                        });
                    }
                    debug!(
                        target: "odm.core.monitor",
                        task = %id,
                        attempt = consecutive_errors,
                        max = self.max_connection_errors,
                        error = %e,
                        "connection error while polling; retrying"
                    );
                    observer.on_event(
                        &Event::new(EventKind::ConnectionRetry)
                            .with_task(id)
                            .with_attempt(consecutive_errors, self.max_connection_errors)
                            .with_delay_ms(delay_ms)
                            .with_reason(e.to_string()),
                    );
                    tokio::time::sleep(self.poll_interval).await;
                    continue;
                }
                Err(e) if e.is_not_found() => {
                    return Err(MonitorError::TaskNotFound {
                        id: id.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    return Err(MonitorError::Node {
                        id: id.clone(),
                        source: e,
                    });
                }
            };
            consecutive_errors = 0;

            let snap = TaskSnapshot::from_payload(raw);
            if last_progress != Some(snap.progress) {
                last_progress = Some(snap.progress);
                debug!(target: "odm.core.monitor", task = %id, status = %snap.status, progress = snap.progress, "task progress");
                observer.on_event(
                    &Event::new(EventKind::TaskProgress)
                        .with_task(id)
                        .with_status(snap.status)
                        .with_percent(snap.progress),
                );
            }

            if snap.status.is_terminal() {
                return finish(id, snap, observer);
            }
            if snap.status == TaskStatus::Unknown {
                debug!(target: "odm.core.monitor", task = %id, raw = %snap.raw, "unclassifiable status; polling again");
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Report a terminal snapshot; only `Completed` is a success.
fn finish(
    id: &TaskId,
    snap: TaskSnapshot,
    observer: &dyn Observer,
) -> Result<TaskSnapshot, MonitorError> {
    if snap.status == TaskStatus::Completed {
        debug!(target: "odm.core.monitor", task = %id, "task completed");
        observer.on_event(
            &Event::new(EventKind::TaskCompleted)
                .with_task(id)
                .with_status(snap.status)
                .with_percent(snap.progress),
        );
        return Ok(snap);
    }

    let mut ended = Event::new(EventKind::TaskEnded)
        .with_task(id)
        .with_status(snap.status)
        .with_percent(snap.progress);
    if let Some(reason) = &snap.last_error {
        ended = ended.with_reason(reason.clone());
    }
    observer.on_event(&ended);
    Err(MonitorError::TaskEnded {
        id: id.clone(),
        status: snap.status,
        progress: snap.progress,
        last_error: snap.last_error,
        info: snap.raw.to_string(),
    })
}
