use serde_json::Value;

use crate::TaskStatus;

/// Normalized view of one remote status payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSnapshot {
    pub status: TaskStatus,
    /// Progress percentage, clamped to `0..=100`.
    pub progress: u8,
    pub last_error: Option<String>,
    /// Payload as the node returned it, kept for diagnostics.
    pub raw: Value,
}

impl TaskSnapshot {
    /// Classify a raw task-info payload.
    ///
    /// `status` may be an object carrying `code` (and `errorMessage`), a bare code,
    /// or a status name. Anything else classifies as [`TaskStatus::Unknown`].
    /// A missing or malformed `progress` reads as `0`.
    pub fn from_payload(raw: Value) -> Self {
        let status = parse_status(raw.get("status"));
        let progress = parse_progress(raw.get("progress"));
        let last_error = parse_last_error(&raw);

        Self {
            status,
            progress,
            last_error,
            raw,
        }
    }
}

fn parse_status(value: Option<&Value>) -> TaskStatus {
    match value {
        Some(Value::Object(obj)) => {
            if let Some(code) = obj.get("code").and_then(Value::as_i64) {
                TaskStatus::from_code(code)
            } else if let Some(name) = obj.get("name").and_then(Value::as_str) {
                TaskStatus::from_name(name)
            } else {
                TaskStatus::Unknown
            }
        }
        Some(Value::Number(n)) => n.as_i64().map_or(TaskStatus::Unknown, TaskStatus::from_code),
        Some(Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(code) => TaskStatus::from_code(code),
            Err(_) => TaskStatus::from_name(s),
        },
        _ => TaskStatus::Unknown,
    }
}

fn parse_progress(value: Option<&Value>) -> u8 {
    let pct = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match pct {
        Some(p) if p.is_finite() => p.clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

fn parse_last_error(raw: &Value) -> Option<String> {
    let nested = raw
        .get("status")
        .and_then(|s| s.get("errorMessage"))
        .and_then(Value::as_str);
    let flat = raw
        .get("last_error")
        .or_else(|| raw.get("lastError"))
        .and_then(Value::as_str);

    nested
        .or(flat)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
