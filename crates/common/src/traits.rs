use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{NewsHeadline, OrderFill, OrderRequest, SentimentReading};

/// Account, market data and order primitives of a brokerage. The live
/// implementation talks REST; the backtest one resolves everything against
/// historical data. The decision loop only ever sees this trait.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    async fn get_cash(&self) -> anyhow::Result<f64>;

    async fn get_last_price(&self, symbol: &str) -> anyhow::Result<f64>;

    /// Headlines published in the closed window `[start, end]`.
    async fn get_news(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<NewsHeadline>>;

    async fn submit_order(&self, order: &OrderRequest) -> anyhow::Result<OrderFill>;

    /// Close any open position in `symbol`, long or short.
    async fn liquidate_all(&self, symbol: &str) -> anyhow::Result<()>;
}

/// Headline sentiment scoring. An empty input must yield
/// `SentimentReading::neutral()`, not an error.
#[async_trait]
pub trait SentimentOracle: Send + Sync {
    async fn score(&self, headlines: &[NewsHeadline]) -> anyhow::Result<SentimentReading>;
}
