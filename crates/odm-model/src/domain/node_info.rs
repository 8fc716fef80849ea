use serde::{Deserialize, Serialize};

/// Answer of a node's info endpoint. Every field is optional; nodes differ in what they report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_queue_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_images: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_memory: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_memory: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node_odm_info_and_ignores_unknown_fields() {
        let info: NodeInfo = serde_json::from_str(
            r#"{"version":"2.2.0","taskQueueCount":1,"maxImages":null,"engine":"odm",
                "engineVersion":"3.3.0","cpuCores":8,"availableMemory":1024,"totalMemory":4096,
                "maxParallelTasks":2}"#,
        )
        .unwrap();
        assert_eq!(info.engine.as_deref(), Some("odm"));
        assert_eq!(info.task_queue_count, Some(1));
        assert_eq!(info.max_images, None);
        assert_eq!(info.cpu_cores, Some(8));
    }
}
