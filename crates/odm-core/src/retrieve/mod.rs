use std::path::Path;

use tracing::{debug, info};

use crate::{
    error::RetrieveError,
    node::TaskHandle,
    observer::{Event, EventKind, Observer},
};

/// Download every asset of a finished task into `dest`, creating it if needed.
///
/// Repeating the call overwrites the previous download.
pub async fn retrieve(
    handle: &TaskHandle,
    dest: &Path,
    observer: &dyn Observer,
) -> Result<(), RetrieveError> {
    tokio::fs::create_dir_all(dest)
        .await
        .map_err(|e| RetrieveError::CreateDir {
            path: dest.to_path_buf(),
            reason: e.to_string(),
        })?;

    info!(target: "odm.core.retrieve", task = %handle.id(), dest = %dest.display(), "downloading task assets");
    handle
        .node()
        .download_assets(handle.id(), dest)
        .await
        .map_err(|source| RetrieveError::Download {
            id: handle.id().clone(),
            source,
        })?;

    debug!(target: "odm.core.retrieve", task = %handle.id(), "assets downloaded");
    observer.on_event(&Event::new(EventKind::AssetsDownloaded).with_task(handle.id()));
    Ok(())
}
