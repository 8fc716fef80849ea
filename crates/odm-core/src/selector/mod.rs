use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use odm_model::{LoadSample, NodeAddress};

use crate::{
    error::SelectError,
    node::{NodeError, NodeProvider, NodeRef},
    observer::{Event, EventKind, Observer},
    probe::probe,
};

/// Pick the least-loaded address.
///
/// Nodes rank by `(running, queued, total)`; on a tie the earlier address wins.
/// Addresses that fail to open or probe are left out. When none can be probed
/// the first address is returned unprobed.
#[instrument(level = "debug", skip_all, fields(candidates = addresses.len()))]
pub async fn select(
    addresses: &[NodeAddress],
    provider: &dyn NodeProvider,
    timeout: Duration,
    observer: &dyn Observer,
) -> Result<NodeAddress, SelectError> {
    let first = addresses.first().ok_or(SelectError::NoAddresses)?;
    let mut best: Option<(LoadSample, &NodeAddress)> = None;

    for address in addresses {
        let outcome = match provider.open(address, timeout) {
            Ok(node) => probe(node.as_ref(), timeout).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(load) => {
                debug!(target: "odm.core.selector", node = %address, %load, "node probed");
                observer.on_event(
                    &Event::new(EventKind::NodeProbed)
                        .with_node(address)
                        .with_load(load),
                );
                if best.is_none_or(|(current, _)| load < current) {
                    best = Some((load, address));
                }
            }
            Err(reason) => {
                debug!(target: "odm.core.selector", node = %address, %reason, "node excluded from selection");
                observer.on_event(
                    &Event::new(EventKind::NodeUnreachable)
                        .with_node(address)
                        .with_reason(reason),
                );
            }
        }
    }

    let chosen = match best {
        Some((load, address)) => {
            debug!(target: "odm.core.selector", node = %address, %load, "selected least-loaded node");
            address.clone()
        }
        None => {
            warn!(target: "odm.core.selector", node = %first, "no node could be probed; falling back to the first address");
            first.clone()
        }
    };
    observer.on_event(&Event::new(EventKind::NodeSelected).with_node(&chosen));
    Ok(chosen)
}

/// Open `address` and check that the node answers its info endpoint.
pub async fn connect(
    provider: &dyn NodeProvider,
    address: &NodeAddress,
    timeout: Duration,
) -> Result<NodeRef, NodeError> {
    let node = provider.open(address, timeout)?;
    let info = node.info().await?;
    info!(
        target: "odm.core.selector",
        node = %address,
        version = info.version.as_deref().unwrap_or("unknown"),
        engine = info.engine.as_deref().unwrap_or("unknown"),
        engine_version = info.engine_version.as_deref().unwrap_or("unknown"),
        cpu_cores = info.cpu_cores.unwrap_or_default(),
        available_memory = info.available_memory.unwrap_or_default(),
        "connected to node"
    );
    Ok(node)
}
