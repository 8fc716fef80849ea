//! `odm`: drone video to photogrammetry results through remote processing nodes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use odm_client::{ClientConfig, HttpNodeProvider};
use odm_core::{NodeProvider, probe, resolve_from_env};
use odm_exec::FfmpegExtractor;
use odm_model::{FrameOverrides, ProcessingOptions};
use odm_observe::{Journal, LoggerConfig, logger_init};
use odm_pipeline::{AppConfig, Pipeline, RunRequest, config::DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "odm")]
#[command(about = "Drone video -> frames -> remote photogrammetry pipeline", long_about = None)]
struct Cli {
    /// Path to the YAML config
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    /// Override the configured log level (e.g. `debug`, `info,odm_core=trace`)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Override the configured log format (text|json|journald)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full pipeline on one video
    Run(RunArgs),

    /// Print the node addresses the pipeline would choose from
    Hosts,

    /// Probe every node and print its current load
    Probe,

    /// Write a documented sample config
    GenerateConfig {
        /// Output path for the config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input video
    #[arg(long)]
    video: PathBuf,

    /// Run id; derived from the clock and the video digest when omitted
    #[arg(long)]
    run_id: Option<String>,

    /// Frames extracted per second of video
    #[arg(long)]
    fps: Option<f64>,

    /// Maximum frames kept (0 = unlimited)
    #[arg(long)]
    max_frames: Option<u32>,

    /// Offset into the video where extraction starts
    #[arg(long)]
    start_seconds: Option<f64>,

    /// Length of the extracted segment (0 = until the end)
    #[arg(long)]
    duration_seconds: Option<f64>,

    /// Extra processing option as key=value (repeatable)
    #[arg(long = "odm-opt", value_name = "KEY=VALUE")]
    odm_opt: Vec<String>,

    /// Do not copy key results into the processed dir
    #[arg(long)]
    no_copy_processed: bool,
}

impl RunArgs {
    fn request(&self) -> Result<RunRequest> {
        let options = ProcessingOptions::parse_overrides(&self.odm_opt)
            .context("invalid --odm-opt (expected key=value)")?;
        let frames = FrameOverrides {
            fps: self.fps,
            max_frames: self.max_frames,
            start_seconds: self.start_seconds,
            duration_seconds: self.duration_seconds,
        };

        let mut req = RunRequest::new(&self.video)
            .with_frames(frames)
            .with_options(options)
            .with_copy_processed(!self.no_copy_processed);
        if let Some(id) = self.run_id.as_deref().filter(|id| !id.trim().is_empty()) {
            req = req.with_run_id(id);
        }
        Ok(req)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::GenerateConfig { output, force } = &cli.command {
        return generate_config_command(output, *force);
    }

    let config = AppConfig::load(&cli.config)?;
    init_logging(&cli, &config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;

    match cli.command {
        Commands::Run(args) => runtime.block_on(run_command(config, args)),
        Commands::Hosts => hosts_command(&config),
        Commands::Probe => runtime.block_on(probe_command(&config)),
        Commands::GenerateConfig { .. } => Ok(()),
    }
}

fn init_logging(cli: &Cli, config: &AppConfig) -> Result<()> {
    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.runtime.log_level);
    let format = cli
        .log_format
        .as_deref()
        .unwrap_or(&config.runtime.log_format);
    let logger = LoggerConfig::from_settings(level, format)?;
    logger_init(&logger)?;
    Ok(())
}

fn provider(config: &AppConfig) -> Result<HttpNodeProvider> {
    let client = ClientConfig {
        request_timeout: config.odm.request_timeout(),
        ..ClientConfig::default()
    };
    Ok(HttpNodeProvider::new(&client)?)
}

async fn run_command(config: AppConfig, args: RunArgs) -> Result<()> {
    let request = args.request()?;
    let provider = provider(&config)?;
    let pipeline = Pipeline::new(config, FfmpegExtractor::new(), provider)
        .with_observer(std::sync::Arc::new(Journal::new()));

    let outcome = pipeline.run(request).await?;

    println!("run:     {}", outcome.run_id);
    println!("node:    {}", outcome.node);
    println!("task:    {}", outcome.task);
    println!("results: {}", outcome.output_dir().display());
    for file in &outcome.curated {
        println!("  copied {}", file.display());
    }
    Ok(())
}

fn hosts_command(config: &AppConfig) -> Result<()> {
    let hosts = resolve_from_env(&config.odm.host_env, &config.odm.host_default);
    if hosts.is_empty() {
        bail!("no node hosts configured (set {} or odm.host_default)", config.odm.host_env);
    }
    for host in hosts {
        println!("{host}");
    }
    Ok(())
}

async fn probe_command(config: &AppConfig) -> Result<()> {
    let provider = provider(config)?;
    let timeout = config.odm.probe_timeout();

    for host in resolve_from_env(&config.odm.host_env, &config.odm.host_default) {
        let outcome = match provider.open(&host, timeout) {
            Ok(node) => probe(node.as_ref(), timeout)
                .await
                .map_err(anyhow::Error::from),
            Err(e) => Err(e.into()),
        };
        match outcome {
            Ok(load) => println!("{host}\t{load}"),
            Err(e) => println!("{host}\tunreachable: {e}"),
        }
    }
    Ok(())
}

fn generate_config_command(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    std::fs::write(output, AppConfig::sample())
        .with_context(|| format!("cannot write {}", output.display()))?;
    println!("wrote {}", output.display());
    Ok(())
}
