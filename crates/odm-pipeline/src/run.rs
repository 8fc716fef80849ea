//! End-to-end run: video -> frames -> remote task -> assets -> key results.

use std::{path::PathBuf, sync::Arc};

use tracing::{debug, info, instrument};

use odm_core::{
    Event, EventKind, Monitor, NodeProvider, NoopObserver, Observer, SubmitError, Submitter,
    collect_images, connect, resolve_from_env, retrieve, select,
};
use odm_exec::FrameExtractor;
use odm_model::{FrameOverrides, NodeAddress, ProcessingOptions, TaskId, TaskSnapshot};

use crate::{
    config::AppConfig,
    curate::curate,
    error::PipelineError,
    paths::RunPaths,
    run_id::{make_run_id, validate_run_id},
};

/// One invocation of the pipeline.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub video: PathBuf,
    /// Explicit run id; derived from the clock and the video digest when absent.
    pub run_id: Option<String>,
    pub frames: FrameOverrides,
    /// Options layered over the configured ones.
    pub odm_options: ProcessingOptions,
    /// Copy the key results into the processed dir.
    pub copy_processed: bool,
}

impl RunRequest {
    pub fn new(video: impl Into<PathBuf>) -> Self {
        Self {
            video: video.into(),
            run_id: None,
            frames: FrameOverrides::default(),
            odm_options: ProcessingOptions::new(),
            copy_processed: true,
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_frames(mut self, frames: FrameOverrides) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_options(mut self, options: ProcessingOptions) -> Self {
        self.odm_options = options;
        self
    }

    pub fn with_copy_processed(mut self, copy: bool) -> Self {
        self.copy_processed = copy;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: String,
    pub paths: RunPaths,
    pub node: NodeAddress,
    pub task: TaskId,
    pub frames: usize,
    pub snapshot: TaskSnapshot,
    /// Key results copied into [`RunPaths::processed_dir`].
    pub curated: Vec<PathBuf>,
}

impl RunOutcome {
    /// Directory holding the full downloaded asset set.
    #[inline]
    pub fn output_dir(&self) -> &PathBuf {
        &self.paths.odm_dir
    }
}

pub struct Pipeline<E, P> {
    config: AppConfig,
    extractor: E,
    provider: P,
    observer: Arc<dyn Observer>,
}

impl<E, P> Pipeline<E, P>
where
    E: FrameExtractor,
    P: NodeProvider,
{
    pub fn new(config: AppConfig, extractor: E, provider: P) -> Self {
        Self {
            config,
            extractor,
            provider,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Node addresses this pipeline would choose from.
    pub fn hosts(&self) -> Vec<NodeAddress> {
        resolve_from_env(&self.config.odm.host_env, &self.config.odm.host_default)
    }

    /// Run every stage in order; the first failure aborts the run.
    #[instrument(level = "info", skip_all, fields(video = %req.video.display()))]
    pub async fn run(&self, req: RunRequest) -> Result<RunOutcome, PipelineError> {
        let observer = self.observer.as_ref();
        let odm = &self.config.odm;

        if !tokio::fs::try_exists(&req.video).await.unwrap_or(false) {
            return Err(PipelineError::VideoNotFound(req.video.clone()));
        }
        let params = req.frames.apply(self.config.video.params());
        params
            .validate()
            .map_err(|e| PipelineError::InvalidParams(e.to_string()))?;

        let run_id = match req.run_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                validate_run_id(id).map_err(PipelineError::InvalidRunId)?;
                id.to_string()
            }
            None => self.derive_run_id(&req.video).await?,
        };

        let paths = RunPaths::build(
            &self.config.runtime.runs_dir,
            &self.config.runtime.data_dir,
            &run_id,
        );
        paths
            .materialize()
            .await
            .map_err(|e| PipelineError::Layout {
                path: paths.run_dir.clone(),
                reason: e.to_string(),
            })?;
        info!(target: "odm.pipeline", run_id = %run_id, run_dir = %paths.run_dir.display(), "run started");

        // 1) frames
        let frames = self
            .extractor
            .extract(&req.video, &paths.frames_dir, &params)
            .await?;
        debug!(target: "odm.pipeline", extractor = self.extractor.name(), frames, dir = %paths.frames_dir.display(), "frames ready");
        observer.on_event(&Event::new(EventKind::FramesExtracted).with_count(frames));

        // 2) node
        let hosts = self.hosts();
        let address = select(&hosts, &self.provider, odm.probe_timeout(), observer).await?;
        let node = connect(&self.provider, &address, odm.request_timeout()).await?;

        // 3) task
        let options = self.config.odm_options.merged(&req.odm_options);
        let frames_dir = paths.frames_dir.clone();
        let images = tokio::task::spawn_blocking(move || collect_images(&frames_dir))
            .await
            .map_err(|e| SubmitError::Inputs {
                dir: paths.frames_dir.clone(),
                reason: e.to_string(),
            })??;
        let handle = Submitter::new(odm.parallel_uploads)
            .with_task_name(run_id.as_str())
            .submit(node, images, &options, observer)
            .await?;

        // 4) wait
        let snapshot = Monitor::new(odm.poll_interval())
            .with_max_connection_errors(odm.max_connection_errors)
            .wait(&handle, observer)
            .await?;

        // 5) assets
        retrieve(&handle, &paths.odm_dir, observer).await?;

        // 6) key results
        let curated = if req.copy_processed {
            let copied = curate(&paths.odm_dir, &paths.processed_dir)
                .await
                .map_err(|e| PipelineError::Curate {
                    path: paths.processed_dir.clone(),
                    reason: e.to_string(),
                })?;
            observer.on_event(&Event::new(EventKind::ResultsCurated).with_count(copied.len()));
            copied
        } else {
            Vec::new()
        };

        info!(target: "odm.pipeline", run_id = %run_id, results = %paths.odm_dir.display(), "pipeline completed");
        Ok(RunOutcome {
            run_id,
            node: handle.address().clone(),
            task: handle.id().clone(),
            paths,
            frames,
            snapshot,
            curated,
        })
    }

    async fn derive_run_id(&self, video: &std::path::Path) -> Result<String, PipelineError> {
        let path = video.to_path_buf();
        let hash_err = |reason: String| PipelineError::Hash {
            path: video.to_path_buf(),
            reason,
        };
        tokio::task::spawn_blocking(move || make_run_id(&path))
            .await
            .map_err(|e| hash_err(e.to_string()))?
            .map_err(|e| hash_err(e.to_string()))
    }
}
