mod frames;
pub use frames::{FrameExtractParams, FrameOverrides};
