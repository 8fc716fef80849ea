pub mod error;
pub use error::ExecError;

pub mod frames;
pub use frames::{FRAME_PATTERN, FrameExtractor, cap_frames, list_frames};

#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegExtractor;

pub mod util;
