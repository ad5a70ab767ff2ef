use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use common::actors::{Actor, ActorType, ControlMessage};
use common::traits::{BrokerGateway, SentimentOracle};
use strategy::SentimentStrategy;

use crate::runner::{TickOutcome, run_tick};
use crate::services::trade_recorder::TradeRecorder;

/// The live/paper scheduler: one full decision cycle per poll interval.
/// Ticks never overlap; a failed or timed-out tick is skipped, not fatal.
/// A stop request is honored between ticks so an in-flight submission
/// always completes.
pub struct TraderService {
    strategy: SentimentStrategy,
    gateway: Arc<dyn BrokerGateway>,
    oracle: Arc<dyn SentimentOracle>,
    recorder: TradeRecorder,
    poll_interval: Duration,
    tick_timeout: Duration,
    shutdown: watch::Receiver<bool>,
}

#[async_trait]
impl Actor for TraderService {
    fn name(&self) -> ActorType {
        ActorType::TraderActor
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let heartbeat_handle = self.spawn_heartbeat(supervisor_tx.clone());

        info!(
            "Starting trader loop: {} every {:?}",
            self.strategy.symbol(),
            self.poll_interval
        );

        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("Stop requested; trader loop exiting");
                        break;
                    }
                }

                _ = interval.tick() => {
                    let tick = run_tick(
                        &mut self.strategy,
                        self.gateway.as_ref(),
                        self.oracle.as_ref(),
                        &self.recorder,
                        Utc::now(),
                    );
                    let result = time::timeout(self.tick_timeout, tick).await;

                    match result {
                        Ok(Ok(TickOutcome::Traded { order, .. })) => {
                            info!("Tick complete: entered {} {}", order.side, order.symbol);
                        }
                        Ok(Ok(TickOutcome::Held(reason))) => {
                            debug!("Tick complete: held ({:?})", reason);
                        }
                        Ok(Err(e)) => {
                            error!("Tick failed, skipping until next interval: {:#}", e);
                            supervisor_tx
                                .send(ControlMessage::Error(self.name(), format!("{e:#}")))
                                .await?;
                        }
                        Err(_) => {
                            error!("Tick exceeded {:?}, skipping", self.tick_timeout);
                            supervisor_tx
                                .send(ControlMessage::Error(
                                    self.name(),
                                    "tick timed out".to_string(),
                                ))
                                .await?;
                        }
                    }
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

impl TraderService {
    pub fn new(
        strategy: SentimentStrategy,
        gateway: Arc<dyn BrokerGateway>,
        oracle: Arc<dyn SentimentOracle>,
        recorder: TradeRecorder,
        poll_interval: Duration,
        tick_timeout: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            strategy,
            gateway,
            oracle,
            recorder,
            poll_interval,
            tick_timeout,
            shutdown,
        }
    }
}
