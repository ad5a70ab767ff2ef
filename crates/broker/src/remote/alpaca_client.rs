use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use common::models::{NewsHeadline, OrderFill, OrderRequest};
use common::traits::BrokerGateway;

use super::account_response::AccountResponse;
use super::news_response::NewsResponse;
use super::order_response::OrderResponse;
use super::trade_response::LatestTradeResponse;

const PAPER_TRADING_URL: &str = "https://paper-api.alpaca.markets";
const LIVE_TRADING_URL: &str = "https://api.alpaca.markets";
const DATA_URL: &str = "https://data.alpaca.markets";

/// Broker credentials, supplied once at construction. Nothing in the
/// decision path reads the environment.
#[derive(Debug, Clone)]
pub struct BrokerCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub paper: bool,
}

#[derive(Debug, Error)]
pub enum AlpacaError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("broker rejected request ({status}): {body}")]
    Api { status: StatusCode, body: String },
    #[error("malformed broker response: {0}")]
    Malformed(String),
}

#[derive(Clone)]
pub struct AlpacaClient {
    http: Client,
    trading_url: String,
    data_url: String,
    api_key: String,
    api_secret: String,
}

/// Wire shape of a bracket order. Alpaca wants quantities and prices as
/// strings, with the exit legs nested under their own keys.
#[derive(Debug, Serialize)]
struct BracketOrderPayload {
    symbol: String,
    qty: String,
    side: String,
    #[serde(rename = "type")]
    order_type: String,
    time_in_force: String,
    order_class: String,
    take_profit: TakeProfitLeg,
    stop_loss: StopLossLeg,
}

#[derive(Debug, Serialize)]
struct TakeProfitLeg {
    limit_price: String,
}

#[derive(Debug, Serialize)]
struct StopLossLeg {
    stop_price: String,
}

impl AlpacaClient {
    pub fn new(creds: &BrokerCredentials) -> Self {
        let trading_url = if creds.paper {
            PAPER_TRADING_URL
        } else {
            LIVE_TRADING_URL
        };

        Self {
            http: Client::new(),
            trading_url: trading_url.to_string(),
            data_url: DATA_URL.to_string(),
            api_key: creds.api_key.clone(),
            api_secret: creds.api_secret.clone(),
        }
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.api_secret)
    }

    async fn check(resp: Response) -> Result<Response, AlpacaError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AlpacaError::Api { status, body });
        }
        Ok(resp)
    }

    async fn fetch_cash(&self) -> Result<f64, AlpacaError> {
        let url = format!("{}/v2/account", self.trading_url);
        let resp = Self::check(self.authed(self.http.get(&url)).send().await?).await?;
        let account = resp.json::<AccountResponse>().await?;
        account.cash_f64()
    }

    async fn fetch_last_price(&self, symbol: &str) -> Result<f64, AlpacaError> {
        let url = format!("{}/v2/stocks/{}/trades/latest", self.data_url, symbol);
        let resp = Self::check(self.authed(self.http.get(&url)).send().await?).await?;
        let latest = resp.json::<LatestTradeResponse>().await?;
        Ok(latest.trade.price)
    }

    async fn fetch_news(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NewsHeadline>, AlpacaError> {
        let url = format!(
            "{}/v1beta1/news?symbols={}&start={}&end={}&limit=50",
            self.data_url,
            symbol,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        );
        let resp = Self::check(self.authed(self.http.get(&url)).send().await?).await?;
        let page = resp.json::<NewsResponse>().await?;
        Ok(page.into_headlines())
    }

    async fn post_bracket(&self, order: &OrderRequest) -> Result<OrderFill, AlpacaError> {
        let payload = BracketOrderPayload {
            symbol: order.symbol.clone(),
            qty: order.quantity.to_string(),
            side: order.side.to_string(),
            order_type: "market".to_string(),
            time_in_force: "gtc".to_string(),
            order_class: "bracket".to_string(),
            take_profit: TakeProfitLeg {
                limit_price: format!("{:.2}", order.take_profit_price),
            },
            stop_loss: StopLossLeg {
                stop_price: format!("{:.2}", order.stop_loss_price),
            },
        };

        info!(
            "Placing bracket order: {} {} {} (tp {:.2} / sl {:.2})",
            order.side, order.quantity, order.symbol, order.take_profit_price, order.stop_loss_price
        );

        let url = format!("{}/v2/orders", self.trading_url);
        let resp =
            Self::check(self.authed(self.http.post(&url)).json(&payload).send().await?).await?;
        let placed = resp.json::<OrderResponse>().await?;

        info!("Order accepted: id={} status={}", placed.id, placed.status);
        Ok(placed.to_fill(order.quantity))
    }

    async fn close_position(&self, symbol: &str) -> Result<(), AlpacaError> {
        let url = format!("{}/v2/positions/{}", self.trading_url, symbol);
        let resp = self.authed(self.http.delete(&url)).send().await?;

        // 404 means no open position, which is exactly the state we want.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(resp).await?;
        info!("Liquidated position in {}", symbol);
        Ok(())
    }
}

#[async_trait]
impl BrokerGateway for AlpacaClient {
    async fn get_cash(&self) -> anyhow::Result<f64> {
        Ok(self.fetch_cash().await?)
    }

    async fn get_last_price(&self, symbol: &str) -> anyhow::Result<f64> {
        Ok(self.fetch_last_price(symbol).await?)
    }

    async fn get_news(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<NewsHeadline>> {
        Ok(self.fetch_news(symbol, start, end).await?)
    }

    async fn submit_order(&self, order: &OrderRequest) -> anyhow::Result<OrderFill> {
        Ok(self.post_bracket(order).await?)
    }

    async fn liquidate_all(&self, symbol: &str) -> anyhow::Result<()> {
        Ok(self.close_position(symbol).await?)
    }
}
