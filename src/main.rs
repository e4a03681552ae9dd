//! Line Monitor
//!
//! Reads newline-delimited JSON samples from stdin and writes each crossing
//! as a JSON line on stdout. Logs go to stderr.
//!
//! ```text
//! line-monitor settings.json < samples.jsonl > crossings.jsonl
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use line_monitor::{MonitorService, MonitorSettings, PlayerSample, VERSION};

/// One input line.
#[derive(Debug, Deserialize)]
struct InputRecord {
    server_world_time: i64,
    sample: PlayerSample,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Line Monitor v{}", VERSION);

    let path = std::env::args()
        .nth(1)
        .context("usage: line-monitor <settings.json>")?;
    let settings = MonitorSettings::load(&path)
        .with_context(|| format!("Failed to load settings from {}", path))?;
    let monitor = Arc::new(settings.build_monitor().context("Failed to register markers")?);

    info!(
        lines = monitor.line_count(),
        distance_marks = monitor.distance_mark_count(),
        rider_timeout_secs = settings.rider_timeout_secs,
        "Monitor ready"
    );

    let handle = MonitorService::spawn(monitor);
    let mut crossings = handle.subscribe().await;

    // Writer task: one JSON object per crossing
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = crossings.recv().await {
            let mut line = serde_json::to_vec(&event)?;
            line.push(b'\n');
            stdout.write_all(&line).await?;
            stdout.flush().await?;
        }
        Ok::<_, anyhow::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut accepted = 0u64;
    let mut rejected = 0u64;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<InputRecord>(&line) {
            Ok(record) => {
                handle.submit(record.sample, record.server_world_time).await?;
                accepted += 1;
            }
            Err(e) => {
                rejected += 1;
                warn!("Skipping malformed sample: {}", e);
            }
        }
    }

    info!(accepted, rejected, "Input closed, draining");
    handle.shutdown().await?;
    writer.await.context("Writer task failed")??;

    Ok(())
}
