use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid node address: {0}")]
    InvalidAddress(String),

    #[error("invalid processing option '{0}' (expected key=value)")]
    InvalidOption(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
