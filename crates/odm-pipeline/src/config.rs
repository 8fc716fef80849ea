//! YAML application config.
//!
//! Every field has a default, so an empty file (or an empty section) is valid.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use odm_core::{DEFAULT_HOST, DEFAULT_MAX_CONNECTION_ERRORS, HOSTS_ENV};
use odm_model::{FrameExtractParams, ProcessingOptions};

pub const DEFAULT_CONFIG_PATH: &str = "configs/default.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config not found: {}; create it (`odm generate-config`) or pass --config <path>", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub project: ProjectConfig,
    pub runtime: RuntimeConfig,
    pub odm: OdmConfig,
    pub video: VideoConfig,
    /// Processing options sent with every task.
    #[serde(deserialize_with = "null_as_default")]
    pub odm_options: ProcessingOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Photogrammetry-ODM".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub runs_dir: PathBuf,
    pub data_dir: PathBuf,
    pub log_level: String,
    pub log_format: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            runs_dir: PathBuf::from("runs"),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdmConfig {
    /// Environment variable holding the host list.
    pub host_env: String,
    /// Host list used when the variable is unset or blank.
    pub host_default: String,
    pub parallel_uploads: usize,
    pub poll_seconds: u64,
    pub max_connection_errors: u32,
    pub probe_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for OdmConfig {
    fn default() -> Self {
        Self {
            host_env: HOSTS_ENV.to_string(),
            host_default: DEFAULT_HOST.to_string(),
            parallel_uploads: 4,
            poll_seconds: 10,
            max_connection_errors: DEFAULT_MAX_CONNECTION_ERRORS,
            probe_timeout_ms: 2_000,
            request_timeout_ms: 10_000,
        }
    }
}

impl OdmConfig {
    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_seconds)
    }

    #[inline]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    #[inline]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub fps: f64,
    /// `0` keeps every frame.
    pub max_frames: u32,
    pub start_seconds: f64,
    /// `0` extracts until the end of the video.
    pub duration_seconds: f64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        let p = FrameExtractParams::default();
        Self {
            fps: p.fps,
            max_frames: p.max_frames,
            start_seconds: p.start_seconds,
            duration_seconds: p.duration_seconds,
        }
    }
}

impl VideoConfig {
    pub fn params(&self) -> FrameExtractParams {
        FrameExtractParams {
            fps: self.fps,
            max_frames: self.max_frames,
            start_seconds: self.start_seconds,
            duration_seconds: self.duration_seconds,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_yaml(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        tracing::debug!(target: "odm.pipeline.config", path = %path.display(), "config loaded");
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        if is_blank_document(text) {
            return Ok(Self::default());
        }
        // a bare `~` document is null too
        let cfg: Option<AppConfig> =
            serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?;
        let cfg = cfg.unwrap_or_default();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.video
            .params()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("video: {e}")))?;
        if self.odm.parallel_uploads == 0 {
            return Err(ConfigError::Invalid("odm.parallel_uploads must be >= 1".into()));
        }
        if self.odm.poll_seconds == 0 {
            return Err(ConfigError::Invalid("odm.poll_seconds must be >= 1".into()));
        }
        if self.odm.max_connection_errors == 0 {
            return Err(ConfigError::Invalid("odm.max_connection_errors must be >= 1".into()));
        }
        if self.odm.host_env.trim().is_empty() {
            return Err(ConfigError::Invalid("odm.host_env must not be empty".into()));
        }
        if self.odm.host_default.trim().is_empty() {
            return Err(ConfigError::Invalid("odm.host_default must not be empty".into()));
        }
        Ok(())
    }

    /// Documented config file with every default spelled out.
    pub fn sample() -> &'static str {
        SAMPLE
    }
}

fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

const SAMPLE: &str = r#"# Photogrammetry pipeline config.
project:
  name: Photogrammetry-ODM

runtime:
  # per-run working dirs: <runs_dir>/<run_id>/{logs,odm}
  runs_dir: runs
  # frames land in <data_dir>/interim/frames/<run_id>,
  # key results in <data_dir>/processed/odm_results/<run_id>
  data_dir: data
  log_level: info
  # text | json | journald
  log_format: text

odm:
  # comma/space/newline separated host list, read from this variable
  host_env: ODM_HOST
  host_default: http://localhost:3000
  parallel_uploads: 4
  poll_seconds: 10
  # consecutive connection errors tolerated while polling
  max_connection_errors: 30
  probe_timeout_ms: 2000
  request_timeout_ms: 10000

video:
  fps: 2
  # 0 = unlimited
  max_frames: 0
  start_seconds: 0
  # 0 = until the end of the video
  duration_seconds: 0

# passed verbatim to the processing node
odm_options: {}
"#;

#[cfg(test)]
mod tests {
    use odm_model::OptionValue;

    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        assert_eq!(AppConfig::from_yaml("").unwrap(), AppConfig::default());
        assert_eq!(AppConfig::from_yaml("odm_options:\n").unwrap(), AppConfig::default());
    }

    #[test]
    fn sample_matches_defaults() {
        assert_eq!(AppConfig::from_yaml(AppConfig::sample()).unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_yaml(
            "odm:\n  parallel_uploads: 8\nvideo:\n  fps: 0.5\nodm_options:\n  dsm: true\n  mesh-size: 200000\n",
        )
        .unwrap();
        assert_eq!(cfg.odm.parallel_uploads, 8);
        assert_eq!(cfg.odm.poll_seconds, 10);
        assert_eq!(cfg.odm.host_env, "ODM_HOST");
        assert_eq!(cfg.video.fps, 0.5);
        assert_eq!(cfg.video.max_frames, 0);
        assert_eq!(cfg.runtime.runs_dir, PathBuf::from("runs"));
        assert_eq!(cfg.odm_options.get("dsm"), Some(&OptionValue::Bool(true)));
        assert_eq!(cfg.odm_options.get("mesh-size"), Some(&OptionValue::Int(200_000)));
    }

    #[test]
    fn durations_follow_the_numbers() {
        let odm = OdmConfig::default();
        assert_eq!(odm.poll_interval(), Duration::from_secs(10));
        assert_eq!(odm.probe_timeout(), Duration::from_secs(2));
        assert_eq!(odm.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn validation_rejects_bad_values() {
        for yaml in [
            "video:\n  fps: 0\n",
            "video:\n  start_seconds: -1\n",
            "odm:\n  parallel_uploads: 0\n",
            "odm:\n  poll_seconds: 0\n",
            "odm:\n  max_connection_errors: 0\n",
            "odm:\n  host_default: \"  \"\n",
        ] {
            assert!(
                matches!(AppConfig::from_yaml(yaml), Err(ConfigError::Invalid(_))),
                "{yaml}"
            );
        }
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_yaml("odm: [1, 2"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn load_reports_missing_file_and_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(AppConfig::load(&missing), Err(ConfigError::NotFound(p)) if p == missing));

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "video: [").unwrap();
        match AppConfig::load(&bad) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, bad),
            other => panic!("unexpected: {other:?}"),
        }

        let good = dir.path().join("good.yaml");
        std::fs::write(&good, AppConfig::sample()).unwrap();
        assert_eq!(AppConfig::load(&good).unwrap(), AppConfig::default());
    }
}
