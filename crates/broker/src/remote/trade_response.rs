use serde::Deserialize;

/// `GET /v2/stocks/{symbol}/trades/latest` on the data API.
#[derive(Debug, Deserialize)]
pub struct LatestTradeResponse {
    pub trade: TradePayload,
}

#[derive(Debug, Deserialize)]
pub struct TradePayload {
    #[serde(rename = "p")]
    pub price: f64,
}
