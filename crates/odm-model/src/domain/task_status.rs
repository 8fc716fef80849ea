use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a remote task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task is waiting for a processing slot on the node.
    Queued,
    /// Task is being processed.
    Running,
    /// Task finished and its assets can be downloaded.
    Completed,
    /// Task finished with an error.
    Failed,
    /// Task was canceled on the node.
    Canceled,
    /// Status could not be classified. Local fallback only; never terminal.
    Unknown,
}

impl TaskStatus {
    /// Map a NodeODM status code.
    pub fn from_code(code: i64) -> Self {
        match code {
            10 => TaskStatus::Queued,
            20 => TaskStatus::Running,
            30 => TaskStatus::Failed,
            40 => TaskStatus::Completed,
            50 => TaskStatus::Canceled,
            _ => TaskStatus::Unknown,
        }
    }

    /// Map a status name. Accepts enum-style names such as `TaskStatus.RUNNING`.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        let name = name.rsplit('.').next().unwrap_or(name);
        match name.to_ascii_uppercase().as_str() {
            "QUEUED" | "PENDING" => TaskStatus::Queued,
            "RUNNING" => TaskStatus::Running,
            "COMPLETED" => TaskStatus::Completed,
            "FAILED" => TaskStatus::Failed,
            "CANCELED" | "CANCELLED" => TaskStatus::Canceled,
            _ => TaskStatus::Unknown,
        }
    }

    /// Returns `true` if the task won't transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Canceled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Queued => "QUEUED",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Canceled => "CANCELED",
            TaskStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
