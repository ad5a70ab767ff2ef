use serde::Deserialize;

use common::models::OrderFill;

/// `POST /v2/orders`. Fill fields are nullable strings until the order
/// actually executes; a fresh bracket usually comes back `accepted`.
#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
    pub filled_qty: Option<String>,
    pub filled_avg_price: Option<String>,
}

impl OrderResponse {
    /// Collapse into the domain fill. An order that has not executed yet
    /// reports the submitted quantity and a zero average price, the same
    /// way the broker reports it.
    pub fn to_fill(&self, submitted_qty: u64) -> OrderFill {
        let filled_qty = self
            .filled_qty
            .as_deref()
            .and_then(|q| q.parse::<f64>().ok())
            .filter(|q| *q > 0.0)
            .unwrap_or(submitted_qty as f64);

        let filled_avg_price = self
            .filled_avg_price
            .as_deref()
            .and_then(|p| p.parse::<f64>().ok())
            .unwrap_or(0.0);

        OrderFill {
            status: self.status.clone(),
            filled_qty,
            filled_avg_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfilled_order_falls_back_to_submitted_quantity() {
        let raw = r#"{"id":"b6b7","status":"accepted","filled_qty":"0","filled_avg_price":null}"#;
        let resp: OrderResponse = serde_json::from_str(raw).unwrap();
        let fill = resp.to_fill(25);
        assert_eq!(fill.status, "accepted");
        assert!((fill.filled_qty - 25.0).abs() < 1e-9);
        assert!((fill.filled_avg_price - 0.0).abs() < 1e-9);
    }

    #[test]
    fn filled_order_uses_broker_numbers() {
        let raw = r#"{"id":"x","status":"filled","filled_qty":"25","filled_avg_price":"199.87"}"#;
        let resp: OrderResponse = serde_json::from_str(raw).unwrap();
        let fill = resp.to_fill(25);
        assert!((fill.filled_qty - 25.0).abs() < 1e-9);
        assert!((fill.filled_avg_price - 199.87).abs() < 1e-9);
    }
}
