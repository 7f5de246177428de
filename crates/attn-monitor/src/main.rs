//! Attention monitor command-line tool.

use std::path::Path;

use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use attn_analytics::{build_heatmap, compute_score, list_archive, session_scores};
use attn_models::SessionId;
use attn_storage::{LocalSessionStore, LOG_EXTENSION};
use attn_vision::{DatasetWriter, FrameSource, PoseLabel, VisionError};
use attn_monitor::metrics::init_metrics;
use attn_monitor::{MonitorConfig, ReplayFrameSource, SessionManager};

const USAGE: &str = "\
usage: attn-monitor <command>

commands:
  run <frames.jsonl>                              replay a capture as one session
  score <session_id>                              engagement score of a stored session
  archive                                         list stored sessions
  heatmap                                         weekday x hour score heatmap
  capture <frames.jsonl> <attentive|distracted> <dataset.csv>
                                                  append labelled landmarks for training";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing()?;

    let config = MonitorConfig::from_env();
    if let Some(addr) = config.metrics_addr {
        init_metrics(addr)?;
        info!(addr = %addr, "Prometheus exporter listening");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg = |i: usize| {
        args.get(i)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("missing argument\n\n{USAGE}"))
    };

    match args.first().map(String::as_str) {
        Some("run") => run(&config, Path::new(arg(1)?)).await,
        Some("score") => score(&config, arg(1)?).await,
        Some("archive") => archive(&config).await,
        Some("heatmap") => heatmap(&config).await,
        Some("capture") => capture(Path::new(arg(1)?), arg(2)?, Path::new(arg(3)?)),
        Some("-h" | "--help" | "help") => {
            println!("{USAGE}");
            Ok(())
        }
        _ => bail!("unknown command\n\n{USAGE}"),
    }
}

/// Colored output for dev, JSON for production. Logs go to stderr so
/// command output on stdout stays machine-readable.
fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("attn=info".parse()?)
        .add_directive("ort=warn".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(config: &MonitorConfig, capture: &Path) -> anyhow::Result<()> {
    let source = ReplayFrameSource::open(capture)
        .with_context(|| format!("opening capture {}", capture.display()))?;

    let manager = SessionManager::from_config(config);
    let id = manager.start_session(Box::new(source)).await;
    let frames = manager.run_until_stream_end().await;
    info!(session_id = %id, frames = frames, "Replay finished");

    match manager.stop_and_summarize().await {
        Some(summary) => print_json(&summary),
        None => bail!("session {id} was not persisted"),
    }
}

async fn score(config: &MonitorConfig, name: &str) -> anyhow::Result<()> {
    let stem = name
        .strip_suffix(LOG_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(name);
    let id = SessionId::parse(stem)?;
    let store = LocalSessionStore::new(&config.reports_dir);

    let score = compute_score(&store, &id).await;
    print_json(&serde_json::json!({ "session_id": id, "score": score }))
}

async fn archive(config: &MonitorConfig) -> anyhow::Result<()> {
    let store = LocalSessionStore::new(&config.reports_dir);
    print_json(&list_archive(&store, config.archive_sort).await)
}

async fn heatmap(config: &MonitorConfig) -> anyhow::Result<()> {
    let store = LocalSessionStore::new(&config.reports_dir);
    let scores = session_scores(&store).await;
    print_json(&build_heatmap(&scores))
}

fn capture(frames: &Path, label: &str, dataset: &Path) -> anyhow::Result<()> {
    let label = match label.to_lowercase().as_str() {
        "attentive" | "a" => PoseLabel::Other,
        "distracted" | "d" => PoseLabel::Distracted,
        other => bail!("unknown label '{other}', expected attentive or distracted"),
    };

    let mut source = ReplayFrameSource::open(frames)
        .with_context(|| format!("opening capture {}", frames.display()))?;
    let mut writer = DatasetWriter::open(dataset)?;

    let mut skipped = 0usize;
    while let Some(frame) = source.next_frame() {
        let Some(face) = frame.face.as_ref() else {
            skipped += 1;
            continue;
        };
        match writer.append(face, label) {
            Ok(()) => {}
            Err(VisionError::FeatureMismatch { actual, .. }) => {
                warn!(features = actual, "Skipping frame with incomplete face mesh");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    source.release();
    writer.flush()?;

    print_json(&serde_json::json!({
        "dataset": writer.path().display().to_string(),
        "rows": writer.rows_written(),
        "skipped": skipped,
    }))
}
