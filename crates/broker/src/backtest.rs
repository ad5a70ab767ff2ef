use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use common::models::{NewsHeadline, OrderFill, OrderRequest, OrderSide};
use common::traits::BrokerGateway;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("failed to read backtest data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse backtest data file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no bar at or before {0}")]
    NoBar(NaiveDate),
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatedHeadline {
    pub date: NaiveDate,
    pub headline: String,
}

/// Historical daily closes and dated headlines for one symbol.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalData {
    pub bars: Vec<DailyBar>,
    #[serde(default)]
    pub news: Vec<DatedHeadline>,
}

impl HistoricalData {
    pub fn load(path: &Path) -> Result<Self, BacktestError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

struct OpenBracket {
    side: OrderSide,
    take_profit: f64,
    stop_loss: f64,
}

struct SimState {
    clock: NaiveDate,
    cash: f64,
    /// Signed share count; negative while short.
    position: i64,
    bracket: Option<OpenBracket>,
    fills: u32,
}

/// `BrokerGateway` over historical data: the simulated clock decides what
/// "current" means, fills happen at the resolved close, and open bracket
/// legs are checked against each day's close as the clock advances.
pub struct HistoricalGateway {
    symbol: String,
    bars: BTreeMap<NaiveDate, f64>,
    news: Vec<DatedHeadline>,
    state: Mutex<SimState>,
}

impl HistoricalGateway {
    pub fn new(
        symbol: impl Into<String>,
        data: HistoricalData,
        starting_cash: f64,
        start: NaiveDate,
    ) -> Self {
        let bars = data.bars.into_iter().map(|b| (b.date, b.close)).collect();
        Self {
            symbol: symbol.into(),
            bars,
            news: data.news,
            state: Mutex::new(SimState {
                clock: start,
                cash: starting_cash,
                position: 0,
                bracket: None,
                fills: 0,
            }),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Most recent close at or before `at`, bridging weekends and holidays.
    fn latest_close(&self, at: NaiveDate) -> Option<f64> {
        self.bars.range(..=at).next_back().map(|(_, &close)| close)
    }

    /// Move the simulated clock forward and settle any open bracket leg
    /// against the new day's close.
    pub async fn advance_to(&self, date: NaiveDate) {
        let mut state = self.state.lock().await;
        state.clock = date;

        let Some(&close) = self.bars.get(&date) else {
            return;
        };

        if let Some(bracket) = state.bracket.take() {
            let triggered = match bracket.side {
                OrderSide::Buy => close >= bracket.take_profit || close <= bracket.stop_loss,
                OrderSide::Sell => close <= bracket.take_profit || close >= bracket.stop_loss,
            };

            if triggered {
                debug!(
                    "Bracket leg hit on {} at close {:.2}; flattening {} shares",
                    date, close, state.position
                );
                state.cash += state.position as f64 * close;
                state.position = 0;
            } else {
                state.bracket = Some(bracket);
            }
        }
    }

    /// Cash plus the position marked at the latest known close.
    pub async fn equity(&self) -> f64 {
        let state = self.state.lock().await;
        let mark = self.latest_close(state.clock).unwrap_or(0.0);
        state.cash + state.position as f64 * mark
    }

    pub async fn fill_count(&self) -> u32 {
        self.state.lock().await.fills
    }
}

#[async_trait]
impl BrokerGateway for HistoricalGateway {
    async fn get_cash(&self) -> anyhow::Result<f64> {
        Ok(self.state.lock().await.cash)
    }

    async fn get_last_price(&self, _symbol: &str) -> anyhow::Result<f64> {
        let clock = self.state.lock().await.clock;
        self.latest_close(clock)
            .ok_or_else(|| BacktestError::NoBar(clock).into())
    }

    async fn get_news(
        &self,
        _symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<NewsHeadline>> {
        Ok(self
            .news
            .iter()
            .filter(|item| item.date >= start && item.date <= end)
            .map(|item| NewsHeadline::new(item.headline.clone()))
            .collect())
    }

    async fn submit_order(&self, order: &OrderRequest) -> anyhow::Result<OrderFill> {
        let mut state = self.state.lock().await;
        let price = self
            .latest_close(state.clock)
            .ok_or(BacktestError::NoBar(state.clock))?;

        let qty = order.quantity as i64;
        match order.side {
            OrderSide::Buy => {
                state.cash -= qty as f64 * price;
                state.position += qty;
            }
            OrderSide::Sell => {
                state.cash += qty as f64 * price;
                state.position -= qty;
            }
        }

        state.bracket = Some(OpenBracket {
            side: order.side,
            take_profit: order.take_profit_price,
            stop_loss: order.stop_loss_price,
        });
        state.fills += 1;

        info!(
            "[sim {}] filled {} {} {} @ {:.2}",
            state.clock, order.side, order.quantity, order.symbol, price
        );

        Ok(OrderFill {
            status: "filled".to_string(),
            filled_qty: order.quantity as f64,
            filled_avg_price: price,
        })
    }

    async fn liquidate_all(&self, _symbol: &str) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        if state.position != 0 {
            let price = self
                .latest_close(state.clock)
                .ok_or(BacktestError::NoBar(state.clock))?;
            info!(
                "[sim {}] liquidating {} shares @ {:.2}",
                state.clock, state.position, price
            );
            state.cash += state.position as f64 * price;
            state.position = 0;
        }
        state.bracket = None;
        Ok(())
    }
}
