use std::path::{Path, PathBuf};

/// Filesystem layout of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub run_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub frames_dir: PathBuf,
    pub odm_dir: PathBuf,
    pub processed_dir: PathBuf,
}

impl RunPaths {
    pub fn build(runs_dir: &Path, data_dir: &Path, run_id: &str) -> Self {
        let run_dir = runs_dir.join(run_id);
        Self {
            logs_dir: run_dir.join("logs"),
            odm_dir: run_dir.join("odm"),
            frames_dir: data_dir.join("interim").join("frames").join(run_id),
            processed_dir: data_dir.join("processed").join("odm_results").join(run_id),
            run_dir,
        }
    }

    /// Create the run, logs, frames and odm directories. The processed dir is created on curation.
    pub async fn materialize(&self) -> std::io::Result<()> {
        for dir in [&self.run_dir, &self.logs_dir, &self.frames_dir, &self.odm_dir] {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let p = RunPaths::build(Path::new("runs"), Path::new("data"), "run_1");
        assert_eq!(p.run_dir, PathBuf::from("runs/run_1"));
        assert_eq!(p.logs_dir, PathBuf::from("runs/run_1/logs"));
        assert_eq!(p.odm_dir, PathBuf::from("runs/run_1/odm"));
        assert_eq!(p.frames_dir, PathBuf::from("data/interim/frames/run_1"));
        assert_eq!(p.processed_dir, PathBuf::from("data/processed/odm_results/run_1"));
    }

    #[tokio::test]
    async fn materialize_is_repeatable_and_skips_processed() {
        let tmp = tempfile::tempdir().unwrap();
        let p = RunPaths::build(&tmp.path().join("runs"), &tmp.path().join("data"), "r");

        p.materialize().await.unwrap();
        p.materialize().await.unwrap();

        assert!(p.logs_dir.is_dir());
        assert!(p.frames_dir.is_dir());
        assert!(p.odm_dir.is_dir());
        assert!(!p.processed_dir.exists());
    }
}
