use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// A bracket order: market entry plus take-profit and stop-loss exits,
/// submitted as one unit. Immutable once built, submitted exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub quantity: u64,
    pub side: OrderSide,
    pub take_profit_price: f64,
    pub stop_loss_price: f64,
}

/// Broker's answer to a submitted order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFill {
    pub status: String,
    pub filled_qty: f64,
    pub filled_avg_price: f64,
}
