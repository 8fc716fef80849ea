mod config;
mod error;
mod format;
mod log;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;

/// Install the process-wide subscriber described by `cfg`.
///
/// Call once, before the first pipeline stage runs; a second call fails with
/// [`LoggerError::AlreadyInitialized`].
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Text => log::Logger::text(cfg),
        LoggerFormat::Json => log::Logger::json(cfg),
        LoggerFormat::Journald => log::Logger::journald(cfg),
    }?;
    tracing::debug!(
        target: "odm.observe",
        format = %cfg.format,
        level = %cfg.level,
        "logger installed"
    );
    Ok(())
}
