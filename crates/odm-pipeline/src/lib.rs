pub mod config;
pub use config::{AppConfig, ConfigError, OdmConfig, ProjectConfig, RuntimeConfig, VideoConfig};

mod curate;
pub use curate::{KEY_OUTPUTS, curate};

pub mod error;
pub use error::PipelineError;

pub mod paths;
pub use paths::RunPaths;

mod run_id;
pub use run_id::{digest_file, make_run_id, validate_run_id};

pub mod run;
pub use run::{Pipeline, RunOutcome, RunRequest};
