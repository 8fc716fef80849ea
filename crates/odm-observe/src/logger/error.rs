use thiserror::Error;

/// Failures while turning `runtime.log_level` / `runtime.log_format` (or their
/// command-line overrides) into an installed subscriber.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format `{0}`, expected text, json or journald")]
    InvalidFormat(String),
    #[error("journald output needs Linux and the `journald` feature")]
    JournaldNotSupported,
    #[error("a global log subscriber is already installed")]
    AlreadyInitialized,
    #[error("cannot install log subscriber: {0}")]
    InitializationFailed(String),
    #[error("log level `{0}` is not a valid filter directive")]
    InvalidLogLevel(String),
}
