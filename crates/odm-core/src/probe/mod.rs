use std::{future::Future, time::Duration};

use tracing::trace;

use odm_model::{LoadSample, TaskSnapshot, TaskStatus};

use crate::{error::ProbeError, node::RemoteNode};

/// Sample the current workload of `node`.
///
/// Every remote call is bounded by `timeout`. A failure to list tasks fails the
/// probe; a task whose status can't be read is skipped (still part of `total`).
pub async fn probe(node: &dyn RemoteNode, timeout: Duration) -> Result<LoadSample, ProbeError> {
    let address = node.address().to_string();

    let tasks = bounded(&address, timeout, node.task_list()).await?;
    let mut load = LoadSample::new(0, 0, tasks.len() as u32);

    for id in &tasks {
        match bounded(&address, timeout, node.task_info(id)).await {
            Ok(raw) => match TaskSnapshot::from_payload(raw).status {
                TaskStatus::Running => load.running += 1,
                TaskStatus::Queued => load.queued += 1,
                _ => {}
            },
            Err(e) => {
                trace!(target: "odm.core.probe", node = %address, task = %id, error = %e, "task status unreadable; not counted");
            }
        }
    }

    trace!(target: "odm.core.probe", node = %address, %load, "probe done");
    Ok(load)
}

async fn bounded<T, F>(address: &str, timeout: Duration, call: F) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, crate::node::NodeError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(res) => res.map_err(|source| ProbeError::Node {
            address: address.to_string(),
            source,
        }),
        Err(_) => Err(ProbeError::Timeout {
            address: address.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}
