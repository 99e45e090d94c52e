use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use log::{debug, info};
use rust_decimal::Decimal;
use tokio::sync::mpsc;

/// Extracts closing prices from a price file.
///
/// Each non-empty line that is not a `#` comment contributes its last
/// comma-separated column. A non-numeric first line is treated as a header.
pub fn parse_closes(content: &str) -> anyhow::Result<Vec<Decimal>> {
    let mut closes = Vec::new();
    let mut first = true;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let column = line.rsplit(',').next().unwrap_or(line).trim();
        match column.parse::<Decimal>() {
            Ok(close) => closes.push(close),
            Err(_) if first => debug!("Skipping header: {}", line),
            Err(e) => bail!("line {}: invalid close {:?}: {}", idx + 1, column, e),
        }
        first = false;
    }

    Ok(closes)
}

/// Replays closes from `path` into `prices`, one every `interval`.
pub async fn start_price_replay(
    path: &Path,
    interval: Duration,
    prices: mpsc::Sender<Decimal>,
) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading price file {}", path.display()))?;
    let closes = parse_closes(&content)?;
    info!("Replaying {} closes from {}", closes.len(), path.display());

    let mut ticker = tokio::time::interval(interval);
    for close in closes {
        ticker.tick().await;
        if prices.send(close).await.is_err() {
            debug!("Price receiver dropped, stopping replay");
            break;
        }
    }

    Ok(())
}
