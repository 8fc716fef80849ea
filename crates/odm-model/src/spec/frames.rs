use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Parameters of the video-to-frames stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameExtractParams {
    /// Frames extracted per second of video.
    pub fps: f64,
    /// Upper bound on kept frames; `0` means unlimited.
    pub max_frames: u32,
    /// Offset into the video where extraction starts.
    pub start_seconds: f64,
    /// Length of the extracted segment; `0` means until the end of the video.
    pub duration_seconds: f64,
}

impl FrameExtractParams {
    pub fn validate(&self) -> ModelResult<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(ModelError::Invalid(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        if !(self.start_seconds.is_finite() && self.start_seconds >= 0.0) {
            return Err(ModelError::Invalid(format!(
                "start_seconds must be >= 0, got {}",
                self.start_seconds
            )));
        }
        if !(self.duration_seconds.is_finite() && self.duration_seconds >= 0.0) {
            return Err(ModelError::Invalid(format!(
                "duration_seconds must be >= 0, got {}",
                self.duration_seconds
            )));
        }
        Ok(())
    }

    pub fn runs_to_end(&self) -> bool {
        self.duration_seconds == 0.0
    }
}

impl Default for FrameExtractParams {
    fn default() -> Self {
        Self {
            fps: 2.0,
            max_frames: 0,
            start_seconds: 0.0,
            duration_seconds: 0.0,
        }
    }
}

/// Per-run overrides of individual [`FrameExtractParams`] fields.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOverrides {
    pub fps: Option<f64>,
    pub max_frames: Option<u32>,
    pub start_seconds: Option<f64>,
    pub duration_seconds: Option<f64>,
}

impl FrameOverrides {
    pub fn apply(&self, base: FrameExtractParams) -> FrameExtractParams {
        FrameExtractParams {
            fps: self.fps.unwrap_or(base.fps),
            max_frames: self.max_frames.unwrap_or(base.max_frames),
            start_seconds: self.start_seconds.unwrap_or(base.start_seconds),
            duration_seconds: self.duration_seconds.unwrap_or(base.duration_seconds),
        }
    }
}
