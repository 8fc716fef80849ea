use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path as UrlPath, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use odm_client::{ClientConfig, HttpNodeProvider};
use odm_core::{EventKind, MonitorError, RecordingObserver};
use odm_exec::{ExecError, FrameExtractor, cap_frames};
use odm_model::{FrameExtractParams, FrameOverrides, OptionValue, ProcessingOptions, TaskStatus};
use odm_pipeline::{AppConfig, Pipeline, PipelineError, RunRequest};

/// Writes `seconds * fps` empty frames instead of decoding a video.
struct SyntheticExtractor {
    seconds: f64,
}

#[async_trait]
impl FrameExtractor for SyntheticExtractor {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn extract(
        &self,
        _video: &Path,
        out_dir: &Path,
        params: &FrameExtractParams,
    ) -> Result<usize, ExecError> {
        std::fs::create_dir_all(out_dir)?;
        let n = (self.seconds * params.fps).floor() as usize;
        for i in 1..=n {
            std::fs::write(out_dir.join(format!("frame_{i:06}.jpg")), b"\xff\xd8\xff")?;
        }
        cap_frames(out_dir, params.max_frames)
    }
}

#[derive(Default)]
struct FakeNode {
    /// Terminal status code once processing "finishes".
    final_code: i64,
    polls: AtomicUsize,
    uploads: AtomicUsize,
    init_body: Mutex<String>,
}

fn bundle() -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        for (name, data) in [
            ("odm_orthophoto/odm_orthophoto.tif", &b"tif"[..]),
            ("odm_report/report.pdf", &b"pdf"[..]),
            ("odm_dem/dtm.tif", &b"dtm"[..]),
        ] {
            zip.start_file(name, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }
    buf.into_inner()
}

async fn serve(node: Arc<FakeNode>) -> String {
    let app = Router::new()
        .route("/info", get(|| async { Json(json!({ "version": "2.2.0", "engine": "odm" })) }))
        .route("/task/list", get(|| async { Json(json!([])) }))
        .route(
            "/task/new/init",
            post(|State(n): State<Arc<FakeNode>>, body: Bytes| async move {
                *n.init_body.lock().unwrap() = String::from_utf8_lossy(&body).into_owned();
                Json(json!({ "uuid": "e2e-task" }))
            }),
        )
        .route(
            "/task/new/upload/{id}",
            post(|State(n): State<Arc<FakeNode>>| async move {
                n.uploads.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "success": true }))
            }),
        )
        .route(
            "/task/new/commit/{id}",
            post(|UrlPath(id): UrlPath<String>| async move { Json(json!({ "uuid": id })) }),
        )
        .route(
            "/task/{id}/info",
            get(|State(n): State<Arc<FakeNode>>| async move {
                let poll = n.polls.fetch_add(1, Ordering::SeqCst);
                if poll == 0 {
                    Json(json!({ "status": { "code": 20 }, "progress": 40 }))
                } else if n.final_code == 40 {
                    Json(json!({ "status": { "code": 40 }, "progress": 100 }))
                } else {
                    Json(json!({
                        "status": { "code": n.final_code, "errorMessage": "Not enough overlap" },
                        "progress": 60
                    }))
                }
            }),
        )
        .route(
            "/task/{id}/download/all.zip",
            get(|| async { ([(header::CONTENT_TYPE, "application/zip")], bundle()).into_response() }),
        )
        .with_state(node);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(root: &Path, host: &str) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.runtime.runs_dir = root.join("runs");
    cfg.runtime.data_dir = root.join("data");
    // a variable nobody sets, so the default host list is used
    cfg.odm.host_env = "ODM_PIPELINE_E2E_HOSTS_UNSET".to_string();
    cfg.odm.host_default = host.to_string();
    cfg.odm.parallel_uploads = 4;
    cfg.odm.poll_seconds = 1;
    cfg.odm_options = [("dsm", false), ("dtm", true)].into_iter().collect();
    cfg
}

fn video(root: &Path) -> PathBuf {
    let path = root.join("flight.mp4");
    std::fs::write(&path, b"ten seconds of drone footage").unwrap();
    path
}

fn pipeline(cfg: AppConfig) -> Pipeline<SyntheticExtractor, HttpNodeProvider> {
    let provider = HttpNodeProvider::new(&ClientConfig::default()).unwrap();
    Pipeline::new(cfg, SyntheticExtractor { seconds: 10.0 }, provider)
}

#[tokio::test]
async fn ten_second_video_runs_to_completion() {
    let node = Arc::new(FakeNode {
        final_code: 40,
        ..Default::default()
    });
    let host = serve(node.clone()).await;
    let tmp = tempfile::tempdir().unwrap();
    let observer = Arc::new(RecordingObserver::new());

    let request = RunRequest::new(video(tmp.path()))
        .with_run_id("run_e2e")
        .with_options(ProcessingOptions::parse_overrides(["dsm=true"]).unwrap());
    let outcome = pipeline(config(tmp.path(), &host))
        .with_observer(observer.clone())
        .run(request)
        .await
        .unwrap();

    assert_eq!(outcome.run_id, "run_e2e");
    assert_eq!(outcome.frames, 20);
    assert_eq!(outcome.task.as_str(), "e2e-task");
    assert_eq!(outcome.node.as_str(), host);
    assert_eq!(outcome.snapshot.status, TaskStatus::Completed);
    assert_eq!(outcome.snapshot.progress, 100);
    assert_eq!(node.uploads.load(Ordering::SeqCst), 20);

    // request options override config options key by key
    let init = node.init_body.lock().unwrap().clone();
    assert!(init.contains(r#"{"name":"dsm","value":true}"#), "{init}");
    assert!(init.contains(r#"{"name":"dtm","value":true}"#), "{init}");

    let odm_dir = tmp.path().join("runs/run_e2e/odm");
    assert_eq!(outcome.output_dir(), &odm_dir);
    assert!(odm_dir.join("odm_dem/dtm.tif").is_file());
    assert!(tmp.path().join("runs/run_e2e/logs").is_dir());
    assert_eq!(
        std::fs::read_dir(tmp.path().join("data/interim/frames/run_e2e"))
            .unwrap()
            .count(),
        20
    );

    let processed = tmp.path().join("data/processed/odm_results/run_e2e");
    assert_eq!(
        outcome.curated,
        vec![processed.join("odm_orthophoto.tif"), processed.join("report.pdf")]
    );

    let progress: Vec<u8> = observer
        .of_kind(EventKind::TaskProgress)
        .into_iter()
        .filter_map(|e| e.percent)
        .collect();
    assert_eq!(progress, vec![40, 100]);
    assert_eq!(
        observer
            .of_kind(EventKind::UploadProgress)
            .last()
            .and_then(|e| e.percent),
        Some(100)
    );
}

#[tokio::test]
async fn failed_task_is_reported_and_nothing_is_curated() {
    let node = Arc::new(FakeNode {
        final_code: 30,
        ..Default::default()
    });
    let host = serve(node).await;
    let tmp = tempfile::tempdir().unwrap();

    let err = pipeline(config(tmp.path(), &host))
        .run(RunRequest::new(video(tmp.path())).with_run_id("run_fail"))
        .await
        .unwrap_err();

    match err {
        PipelineError::Monitor(MonitorError::TaskEnded {
            status,
            progress,
            last_error,
            ..
        }) => {
            assert_eq!(status, TaskStatus::Failed);
            assert_eq!(progress, 60);
            assert_eq!(last_error.as_deref(), Some("Not enough overlap"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!tmp.path().join("data/processed/odm_results/run_fail").exists());
}

#[tokio::test]
async fn frame_overrides_and_no_copy() {
    let node = Arc::new(FakeNode {
        final_code: 40,
        ..Default::default()
    });
    let host = serve(node.clone()).await;
    let tmp = tempfile::tempdir().unwrap();

    let outcome = pipeline(config(tmp.path(), &host))
        .run(
            RunRequest::new(video(tmp.path()))
                .with_frames(FrameOverrides {
                    max_frames: Some(6),
                    ..Default::default()
                })
                .with_copy_processed(false),
        )
        .await
        .unwrap();

    assert_eq!(outcome.frames, 6);
    assert_eq!(node.uploads.load(Ordering::SeqCst), 6);
    assert!(outcome.curated.is_empty());
    assert!(outcome.run_id.starts_with("run_"));
    assert!(!outcome.paths.processed_dir.exists());
}

#[tokio::test]
async fn missing_video_fails_before_any_work() {
    let tmp = tempfile::tempdir().unwrap();
    let err = pipeline(config(tmp.path(), "http://127.0.0.1:9"))
        .run(RunRequest::new(tmp.path().join("missing.mp4")))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::VideoNotFound(_)));
    assert!(!tmp.path().join("runs").exists());
}

#[tokio::test]
async fn unsafe_run_id_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let err = pipeline(config(tmp.path(), "http://127.0.0.1:9"))
        .run(RunRequest::new(video(tmp.path())).with_run_id("../escape"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidRunId(_)));
}

#[tokio::test]
async fn unreachable_only_node_fails_at_connect() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let tmp = tempfile::tempdir().unwrap();

    let err = pipeline(config(tmp.path(), &dead))
        .run(RunRequest::new(video(tmp.path())).with_run_id("run_dead"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Connect(ref e) if e.is_connectivity()), "{err}");
}

#[test]
fn merged_options_keep_config_keys() {
    let cfg = config(Path::new("/tmp"), "h");
    let merged = cfg
        .odm_options
        .merged(&ProcessingOptions::parse_overrides(["dsm=true"]).unwrap());
    assert_eq!(merged.get("dsm"), Some(&OptionValue::Bool(true)));
    assert_eq!(merged.get("dtm"), Some(&OptionValue::Bool(true)));
}
