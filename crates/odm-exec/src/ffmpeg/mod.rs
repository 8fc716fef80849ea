//! Frame extraction through the `ffmpeg` binary.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, instrument};

use odm_model::FrameExtractParams;

use crate::{
    error::ExecError,
    frames::{FRAME_PATTERN, FrameExtractor, cap_frames},
    util::run_cmd,
};

/// JPEG quality passed to `-q:v` (2 is near-lossless).
const JPEG_QUALITY: &str = "2";

#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    program: String,
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
        }
    }
}

impl FfmpegExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another binary (a full path, or a wrapper script).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    #[inline]
    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Command line for one extraction. `-ss`/`-t` are only passed when non-zero.
pub fn build_args(video: &Path, out_dir: &Path, params: &FrameExtractParams) -> Vec<String> {
    let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error", "-y"]
        .into_iter()
        .map(String::from)
        .collect();

    if params.start_seconds > 0.0 {
        args.push("-ss".into());
        args.push(params.start_seconds.to_string());
    }
    args.push("-i".into());
    args.push(video.display().to_string());
    if !params.runs_to_end() {
        args.push("-t".into());
        args.push(params.duration_seconds.to_string());
    }

    args.push("-vf".into());
    args.push(format!("fps={}", params.fps));
    args.push("-q:v".into());
    args.push(JPEG_QUALITY.into());
    args.push(out_dir.join(FRAME_PATTERN).display().to_string());
    args
}

#[async_trait]
impl FrameExtractor for FfmpegExtractor {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    #[instrument(level = "debug", skip_all, fields(video = %video.display(), fps = params.fps))]
    async fn extract(
        &self,
        video: &Path,
        out_dir: &Path,
        params: &FrameExtractParams,
    ) -> Result<usize, ExecError> {
        params
            .validate()
            .map_err(|e| ExecError::InvalidParams(e.to_string()))?;
        if !tokio::fs::try_exists(video).await.unwrap_or(false) {
            return Err(ExecError::VideoNotFound(video.to_path_buf()));
        }
        tokio::fs::create_dir_all(out_dir).await?;

        let args = build_args(video, out_dir, params);
        run_cmd(&self.program, &args, None).await?;

        let dir = out_dir.to_path_buf();
        let max_frames = params.max_frames;
        let kept = tokio::task::spawn_blocking(move || cap_frames(&dir, max_frames))
            .await
            .map_err(|e| ExecError::Io(format!("frame cap task failed: {e}")))??;
        debug!(target: "odm.exec.ffmpeg", frames = kept, out_dir = %out_dir.display(), "frames extracted");
        Ok(kept)
    }
}
