use serde::Deserialize;

use super::alpaca_client::AlpacaError;

/// `GET /v2/account`. Alpaca serializes money fields as strings.
#[derive(Debug, Deserialize)]
pub struct AccountResponse {
    pub cash: String,
    #[serde(rename = "trading_blocked", default)]
    pub trading_blocked: bool,
}

impl AccountResponse {
    pub fn cash_f64(&self) -> Result<f64, AlpacaError> {
        self.cash
            .parse::<f64>()
            .map_err(|_| AlpacaError::Malformed(format!("unparseable cash field: {}", self.cash)))
    }
}
