use anyhow::{Context, anyhow};
use chrono::NaiveTime;
use tracing::{debug, info, warn};

use broker::{HistoricalData, HistoricalGateway, RemoteSentimentOracle};
use common::traits::BrokerGateway;
use strategy::SentimentStrategy;

use crate::config::Config;
use crate::runner::{TickOutcome, run_tick};
use crate::services::trade_recorder::TradeRecorder;

/// Replay the strategy over a closed historical date range. Each simulated
/// day goes through the exact same `run_tick` as the live loop; only the
/// gateway behind the trait differs.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let bt = config
        .backtest
        .as_ref()
        .ok_or_else(|| anyhow!("backtest mode requires BACKTEST_START/BACKTEST_END"))?;

    let data = HistoricalData::load(&bt.data_path)
        .with_context(|| format!("loading {}", bt.data_path.display()))?;

    let gateway = HistoricalGateway::new(config.symbol.clone(), data, bt.starting_cash, bt.start);
    let oracle = RemoteSentimentOracle::new(config.sentiment_url.clone());
    let recorder = TradeRecorder::new(config.trade_log.clone());
    let mut strategy = SentimentStrategy::new(config.symbol.clone(), config.cash_at_risk);

    info!(
        "Backtesting {} from {} to {} with {:.2} starting cash",
        config.symbol, bt.start, bt.end, bt.starting_cash
    );

    let mut ticks = 0u32;
    let mut trades = 0u32;

    let mut date = bt.start;
    while date <= bt.end {
        gateway.advance_to(date).await;
        let now = date.and_time(NaiveTime::MIN).and_utc();

        match run_tick(&mut strategy, &gateway, &oracle, &recorder, now).await {
            Ok(TickOutcome::Traded { order, .. }) => {
                trades += 1;
                info!("{}: {} {} {}", date, order.side, order.quantity, order.symbol);
            }
            Ok(TickOutcome::Held(reason)) => {
                debug!("{}: no action ({:?})", date, reason);
            }
            Err(e) => {
                // missing bars (weekends, halts) and data errors skip the day
                warn!("{}: tick skipped: {:#}", date, e);
            }
        }

        ticks += 1;
        date = date
            .succ_opt()
            .ok_or_else(|| anyhow!("date range overflow"))?;
    }

    let final_cash = gateway.get_cash().await?;
    let equity = gateway.equity().await;
    info!(
        "Backtest complete: {} ticks, {} fills, final cash {:.2}, equity {:.2}",
        ticks, trades, final_cash, equity
    );

    Ok(())
}
