use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::time;
use tracing::{debug, info};

use common::actors::{Actor, ActorType, ControlMessage};

const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Read-only control surface: tails the trade log and surfaces new lines.
/// It only ever observes — it holds no strategy state and submits nothing.
pub struct LogViewerService {
    path: PathBuf,
    shutdown: watch::Receiver<bool>,
    offset: u64,
}

#[async_trait]
impl Actor for LogViewerService {
    fn name(&self) -> ActorType {
        ActorType::LogViewerActor
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let heartbeat_handle = self.spawn_heartbeat(supervisor_tx.clone());

        info!("Tailing trade log at {}", self.path.display());

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                _ = time::sleep(REFRESH_INTERVAL) => {
                    self.show_new_lines().await;
                }
            }
        }

        heartbeat_handle.abort();
        supervisor_tx
            .send(ControlMessage::Shutdown(self.name()))
            .await?;
        Ok(())
    }
}

impl LogViewerService {
    pub fn new(path: PathBuf, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            path,
            shutdown,
            offset: 0,
        }
    }

    async fn show_new_lines(&mut self) {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                // the log may simply not exist until the first trade
                debug!("Trade log not readable yet: {}", e);
                return;
            }
        };

        // the log is truncate-free, so a shorter file means it was replaced
        if (content.len() as u64) < self.offset {
            self.offset = 0;
        }

        let new = match content.get(self.offset as usize..) {
            Some(new) if !new.is_empty() => new,
            _ => return,
        };

        for line in new.lines() {
            info!("trade log | {}", line);
        }
        self.offset = content.len() as u64;
    }
}
