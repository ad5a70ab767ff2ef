use std::sync::Arc;

use anyhow::anyhow;
use dotenvy::dotenv;
use tokio::sync::watch;
use tracing::info;

use broker::{AlpacaClient, RemoteSentimentOracle};
use common::actors::ActorType;
use common::logger;
use common::traits::{BrokerGateway, SentimentOracle};
use strategy::SentimentStrategy;

use executor::actors::Supervisor;
use executor::backtest;
use executor::config::{Config, Mode};
use executor::services::{LogViewerService, TradeRecorder, TraderService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::setup_logger();
    dotenv().ok();

    let config = Config::from_env()?;
    info!(
        "itrader starting: mode={:?} symbol={} cash_at_risk={}",
        config.mode, config.symbol, config.cash_at_risk
    );

    match config.mode {
        Mode::Backtest => backtest::run(&config).await,
        Mode::Live => run_live(config).await,
    }
}

async fn run_live(config: Config) -> anyhow::Result<()> {
    let creds = config
        .credentials
        .clone()
        .ok_or_else(|| anyhow!("live mode requires broker credentials"))?;

    let gateway: Arc<dyn BrokerGateway> = Arc::new(AlpacaClient::new(&creds));
    let oracle: Arc<dyn SentimentOracle> =
        Arc::new(RemoteSentimentOracle::new(config.sentiment_url.clone()));
    let recorder = TradeRecorder::new(config.trade_log.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut supervisor = Supervisor::new();

    let trader_shutdown = shutdown_rx.clone();
    let symbol = config.symbol.clone();
    let cash_at_risk = config.cash_at_risk;
    let poll_interval = config.poll_interval;
    let tick_timeout = config.tick_timeout;
    let trader_recorder = recorder.clone();
    supervisor.register_actor(
        ActorType::TraderActor,
        Box::new(move || {
            // a restarted trader is a fresh strategy instance
            Box::new(TraderService::new(
                SentimentStrategy::new(symbol.clone(), cash_at_risk),
                gateway.clone(),
                oracle.clone(),
                trader_recorder.clone(),
                poll_interval,
                tick_timeout,
                trader_shutdown.clone(),
            ))
        }),
    );

    let viewer_shutdown = shutdown_rx.clone();
    let trade_log = config.trade_log.clone();
    supervisor.register_actor(
        ActorType::LogViewerActor,
        Box::new(move || {
            Box::new(LogViewerService::new(
                trade_log.clone(),
                viewer_shutdown.clone(),
            ))
        }),
    );

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received; letting the in-flight tick finish");
            let _ = shutdown_tx.send(true);
        }
    });

    let grace = config.tick_timeout + std::time::Duration::from_secs(5);
    supervisor.start(shutdown_rx, grace).await;

    info!("itrader stopped");
    Ok(())
}
