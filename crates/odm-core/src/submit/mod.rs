use std::path::{Path, PathBuf};

use futures::{StreamExt, stream};
use tracing::{debug, instrument};

use odm_model::{ProcessingOptions, TaskId};

use crate::{
    error::SubmitError,
    node::{NodeRef, RemoteNode, TaskHandle},
    observer::{Event, EventKind, Observer},
};

/// Upload progress is reported at multiples of this many percent.
pub const PROGRESS_STEP: u8 = 5;

/// Creates a remote task from a set of images.
///
/// Submission is not idempotent: every call creates a new task on the node.
#[derive(Debug, Clone)]
pub struct Submitter {
    parallel_uploads: usize,
    task_name: String,
}

impl Submitter {
    pub fn new(parallel_uploads: usize) -> Self {
        Self {
            parallel_uploads: parallel_uploads.max(1),
            task_name: "odm-task".to_string(),
        }
    }

    #[inline]
    pub fn with_task_name(mut self, name: impl Into<String>) -> Self {
        self.task_name = name.into();
        self
    }

    #[inline]
    pub fn parallel_uploads(&self) -> usize {
        self.parallel_uploads
    }

    /// Init a task with `options`, upload `inputs` (sorted by file name) and commit it.
    #[instrument(level = "debug", skip_all, fields(node = %node.address(), images = inputs.len()))]
    pub async fn submit(
        &self,
        node: NodeRef,
        mut inputs: Vec<PathBuf>,
        options: &ProcessingOptions,
        observer: &dyn Observer,
    ) -> Result<TaskHandle, SubmitError> {
        if inputs.is_empty() {
            return Err(SubmitError::NoInputs);
        }
        inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));

        let id = node
            .init_task(&self.task_name, options)
            .await
            .map_err(|source| SubmitError::Init {
                address: node.address().to_string(),
                source,
            })?;
        debug!(target: "odm.core.submit", task = %id, options = options.len(), "task initialized");
        observer.on_event(
            &Event::new(EventKind::TaskInitialized)
                .with_node(node.address())
                .with_task(&id),
        );

        self.upload_all(node.as_ref(), &id, &inputs, observer).await?;

        node.commit(&id)
            .await
            .map_err(|source| SubmitError::Commit {
                id: id.clone(),
                source,
            })?;
        debug!(target: "odm.core.submit", task = %id, images = inputs.len(), "task committed");
        observer.on_event(
            &Event::new(EventKind::TaskCommitted)
                .with_node(node.address())
                .with_task(&id)
                .with_count(inputs.len()),
        );

        Ok(TaskHandle::new(id, node))
    }

    async fn upload_all(
        &self,
        node: &dyn RemoteNode,
        id: &TaskId,
        inputs: &[PathBuf],
        observer: &dyn Observer,
    ) -> Result<(), SubmitError> {
        let total = inputs.len();
        let mut milestones = Milestones::new(PROGRESS_STEP);
        let mut report = |done: usize| {
            if let Some(pct) = milestones.advance(done * 100 / total) {
                debug!(target: "odm.core.submit", task = %id, pct, done, total, "upload progress");
                observer.on_event(
                    &Event::new(EventKind::UploadProgress)
                        .with_task(id)
                        .with_percent(pct)
                        .with_count(done),
                );
            }
        };
        report(0);

        let mut uploads = stream::iter(inputs)
            .map(move |path| async move {
                node.upload(id, path)
                    .await
                    .map_err(|source| (path.clone(), source))
            })
            .buffer_unordered(self.parallel_uploads);

        let mut done = 0;
        while let Some(res) = uploads.next().await {
            res.map_err(|(file, source)| SubmitError::Upload {
                id: id.clone(),
                file,
                source,
            })?;
            done += 1;
            report(done);
        }
        Ok(())
    }
}

/// Turns a percentage stream into step milestones, each reported at most once, in increasing order.
#[derive(Debug)]
struct Milestones {
    step: u8,
    last: Option<u8>,
}

impl Milestones {
    fn new(step: u8) -> Self {
        Self {
            step: step.max(1),
            last: None,
        }
    }

    fn advance(&mut self, pct: usize) -> Option<u8> {
        let pct = pct.min(100) as u8;
        let milestone = pct / self.step * self.step;
        if self.last.is_some_and(|last| milestone <= last) {
            return None;
        }
        self.last = Some(milestone);
        Some(milestone)
    }
}

/// List the `*.jpg` files of `dir` (extension matched case-insensitively), sorted by name.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>, SubmitError> {
    let inputs_err = |e: std::io::Error| SubmitError::Inputs {
        dir: dir.to_path_buf(),
        reason: e.to_string(),
    };

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(inputs_err)? {
        let path = entry.map_err(inputs_err)?.path();
        let is_jpg = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg"));
        if is_jpg && path.is_file() {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}
