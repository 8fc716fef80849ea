use std::{io::Read, path::Path};

use sha2::{Digest, Sha256};
use time::{OffsetDateTime, macros::format_description};

const CHUNK: usize = 1024 * 1024;
const DIGEST_PREFIX: usize = 10;

/// Lowercase hex SHA-256 of a file, read in 1 MiB chunks.
pub fn digest_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// `run_<YYYYmmdd_HHMMSS>_<first 10 hex chars of the video digest>`, local time.
pub fn make_run_id(video: &Path) -> std::io::Result<String> {
    let digest = digest_file(video)?;
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    Ok(format_run_id(now, &digest))
}

fn format_run_id(at: OffsetDateTime, digest: &str) -> String {
    let stamp = at
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    let prefix: String = digest.chars().take(DIGEST_PREFIX).collect();
    format!("run_{stamp}_{prefix}")
}

/// A run id names directories, so it must be a single plain path component.
pub fn validate_run_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("run id is empty".into());
    }
    if id == "." || id == ".." || id.contains(['/', '\\']) || id.chars().any(char::is_control) {
        return Err(format!("run id {id:?} is not a plain directory name"));
    }
    Ok(())
}
