use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("non-zero exit code {code}: {program}")]
    NonZeroExit {
        program: String,
        code: i32,
        stderr: String,
    },
    #[error("spawn of {program} failed: {reason}")]
    Spawn { program: String, reason: String },
    #[error("killed by signal: {program}")]
    KilledBySignal { program: String },
    #[error("missing program")]
    MissingProgram,
    #[error("video not found: {}", .0.display())]
    VideoNotFound(PathBuf),
    #[error("invalid extraction parameters: {0}")]
    InvalidParams(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ExecError {
    fn from(e: std::io::Error) -> Self {
        ExecError::Io(e.to_string())
    }
}
