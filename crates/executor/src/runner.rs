use chrono::{DateTime, Days, Utc};
use tracing::{debug, info, warn};

use common::models::{AccountSnapshot, OrderFill, OrderRequest};
use common::traits::{BrokerGateway, SentimentOracle};
use strategy::{HoldReason, SentimentStrategy, StrategyError, TickPlan};

use crate::services::trade_recorder::TradeRecorder;

/// How many days of headlines feed each tick's sentiment reading.
const NEWS_WINDOW_DAYS: u64 = 3;

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Held(HoldReason),
    Traded {
        liquidated_first: bool,
        order: OrderRequest,
        fill: OrderFill,
    },
}

/// One full decision cycle: fetch state, score sentiment, plan, execute,
/// record. Shared verbatim by the live scheduler and the backtest driver,
/// so the two modes cannot diverge.
///
/// `strategy.commit` runs strictly after a successful submission; a broker
/// rejection leaves the flip-protection memory untouched.
pub async fn run_tick(
    strategy: &mut SentimentStrategy,
    gateway: &dyn BrokerGateway,
    oracle: &dyn SentimentOracle,
    recorder: &TradeRecorder,
    now: DateTime<Utc>,
) -> anyhow::Result<TickOutcome> {
    let symbol = strategy.symbol().to_string();

    let cash = gateway.get_cash().await?;
    let last_price = gateway.get_last_price(&symbol).await?;
    let account = AccountSnapshot {
        symbol: symbol.clone(),
        cash,
        last_price,
    };

    let today = now.date_naive();
    let window_start = today - Days::new(NEWS_WINDOW_DAYS);
    let headlines = gateway.get_news(&symbol, window_start, today).await?;
    let reading = oracle.score(&headlines).await?;

    debug!(
        "Tick {}: cash={:.2} price={:.2} sentiment={:?}@{:.4} ({} headlines)",
        today,
        cash,
        last_price,
        reading.label,
        reading.probability,
        headlines.len()
    );

    let plan = match strategy.plan(&account, &reading) {
        Ok(plan) => plan,
        Err(StrategyError::InvalidQuantity) => {
            warn!("Order construction rejected: non-positive quantity; holding");
            return Ok(TickOutcome::Held(HoldReason::ZeroQuantity));
        }
    };

    let (liquidate_first, order) = match plan {
        TickPlan::Hold(reason) => {
            debug!("No action this tick: {:?}", reason);
            return Ok(TickOutcome::Held(reason));
        }
        TickPlan::Enter {
            liquidate_first,
            order,
        } => (liquidate_first, order),
    };

    if liquidate_first {
        info!(
            "Flip protection: liquidating opposite {} position before {} entry",
            symbol, order.side
        );
        gateway.liquidate_all(&symbol).await?;
    }

    let fill = gateway.submit_order(&order).await?;
    strategy.commit(order.side);
    recorder.record(&order, &fill).await;

    info!(
        "Executed {} {} {} @ tp {:.2} / sl {:.2} (status: {})",
        order.side, order.quantity, order.symbol, order.take_profit_price, order.stop_loss_price,
        fill.status
    );

    Ok(TickOutcome::Traded {
        liquidated_first: liquidate_first,
        order,
        fill,
    })
}
