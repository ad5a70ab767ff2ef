use std::path::PathBuf;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use common::models::{OrderFill, OrderRequest};

/// Append-only trade journal, one line per filled order. A write failure
/// is retried once and then dropped with a warning; it is never allowed
/// to surface as a trading error after the broker already accepted the
/// order.
#[derive(Clone)]
pub struct TradeRecorder {
    path: PathBuf,
}

impl TradeRecorder {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn record(&self, order: &OrderRequest, fill: &OrderFill) {
        let line = format!(
            "Trade executed: {}, {} shares at {}, status: {}\n",
            order.symbol, order.quantity, fill.filled_avg_price, fill.status
        );

        if let Err(first) = self.append(&line).await {
            warn!("Trade log write failed ({}); retrying once", first);
            if let Err(second) = self.append(&line).await {
                warn!("Dropping trade log entry after retry: {}", second);
            }
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
