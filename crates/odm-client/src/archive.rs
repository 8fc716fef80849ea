use std::path::{Path, PathBuf};

use crate::errors::ClientError;

/// Unpack `archive` into `dest`, overwriting existing files, then delete the archive.
///
/// Entries whose path would escape `dest` are rejected by the zip reader.
pub(crate) async fn extract(archive: PathBuf, dest: PathBuf) -> Result<usize, ClientError> {
    tokio::task::spawn_blocking(move || extract_blocking(&archive, &dest))
        .await
        .map_err(|e| ClientError::Io(std::io::Error::other(e)))?
}

fn extract_blocking(archive: &Path, dest: &Path) -> Result<usize, ClientError> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    let entries = zip.len();
    zip.extract(dest)?;
    drop(zip);
    std::fs::remove_file(archive)?;
    Ok(entries)
}
