use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use odm_model::FrameExtractParams;

use crate::error::ExecError;

/// File name pattern of extracted frames, in `printf` form.
pub const FRAME_PATTERN: &str = "frame_%06d.jpg";

/// Turns a video into a directory of still frames.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Write frames of `video` into `out_dir` (created if absent) and return how many are kept.
    async fn extract(
        &self,
        video: &Path,
        out_dir: &Path,
        params: &FrameExtractParams,
    ) -> Result<usize, ExecError>;
}

/// Extracted frames in `dir` (`frame_*.jpg`), sorted by file name.
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, ExecError> {
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_frame = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("frame_") && n.ends_with(".jpg"));
        if is_frame && path.is_file() {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

/// Delete every frame after the first `max_frames` (in name order). `0` keeps everything.
///
/// Returns the number of frames left.
pub fn cap_frames(dir: &Path, max_frames: u32) -> Result<usize, ExecError> {
    let frames = list_frames(dir)?;
    let keep = max_frames as usize;
    if max_frames == 0 || frames.len() <= keep {
        return Ok(frames.len());
    }

    let extra = &frames[keep..];
    for path in extra {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    info!(target: "odm.exec.frames", max_frames, deleted = extra.len(), "capped frames");
    Ok(keep)
}
