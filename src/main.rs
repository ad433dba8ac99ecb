// src/main.rs
//
// Replays a JSON Lines stream of per-frame detections through the occupancy
// pipeline. The detection loop builds a report every reporting interval of
// stream time and hands it to the reporter task.

use anyhow::{Context, Result};
use chrono::Local;
use std::env;
use table_occupancy::{
    Calibration, Config, FrameDetections, OccupancyPipeline, OccupancyReport, OccupancySnapshot,
};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "OCCUPANCY_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = env::var(CONFIG_ENV).unwrap_or_else(|_| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🪑 Table Occupancy Monitor Starting");
    info!("✓ Configuration loaded from {}", config_path);

    let input = env::args()
        .nth(1)
        .context("usage: table-occupancy <detections.jsonl>")?;

    let calibration = Calibration::load(&config.calibration.path)?;
    let mut pipeline = OccupancyPipeline::new(config.clone(), calibration)?;
    let metrics = pipeline.metrics().clone();

    let (tx, rx) = mpsc::channel::<OccupancyReport>(16);
    let reporter = tokio::spawn(run_reporter(rx));
    let interval_ms = pipeline.config().processing.report_interval_seconds * 1000.0;

    let file = File::open(&input)
        .await
        .with_context(|| format!("opening detections {}", input))?;
    let mut lines = BufReader::new(file).lines();
    let mut line_no = 0usize;
    let mut malformed = 0usize;
    let mut last_reported_ms: Option<f64> = None;
    let mut last_snapshot: Option<OccupancySnapshot> = None;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let frame: FrameDetections = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(e) => {
                malformed += 1;
                warn!("Skipping malformed line {}: {}", line_no, e);
                continue;
            }
        };

        let tick = pipeline.process(&frame)?;
        let due = last_reported_ms.map_or(true, |t| tick.timestamp_ms - t >= interval_ms);
        if due {
            let report = pipeline.report(&tick.snapshot, Local::now())?;
            if tx.send(report).await.is_err() {
                error!("Reporter stopped early, aborting replay");
                break;
            }
            last_reported_ms = Some(tick.timestamp_ms);
        }
        last_snapshot = Some(tick.snapshot);
    }
    drop(tx);
    reporter.await.context("reporter task panicked")?;

    info!("\n========================================");
    info!("✓ Replay finished: {} lines, {} malformed", line_no, malformed);
    match last_snapshot {
        Some(snapshot) => pipeline.report(&snapshot, Local::now())?.log_table(),
        None => warn!("No frames processed, nothing to report"),
    }
    info!(
        "Metrics: {}",
        serde_json::to_string_pretty(&metrics.summary())?
    );
    info!("========================================\n");

    Ok(())
}

async fn run_reporter(mut rx: mpsc::Receiver<OccupancyReport>) {
    while let Some(report) = rx.recv().await {
        report.log_table();
        match report.to_json() {
            Ok(json) => debug!("Report payload: {}", json),
            Err(e) => warn!("Failed to serialize report: {}", e),
        }
    }
}
