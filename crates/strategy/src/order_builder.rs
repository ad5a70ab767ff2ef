use common::models::{OrderRequest, OrderSide};
use thiserror::Error;

use crate::engine::StrategyParams;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StrategyError {
    #[error("bracket order rejected: non-positive quantity")]
    InvalidQuantity,
}

/// Builds the bracket for an entry at `last_price`. Long brackets target
/// a larger upside than the downside stop; short brackets mirror that.
pub fn build_bracket(
    symbol: &str,
    quantity: u64,
    side: OrderSide,
    last_price: f64,
    params: &StrategyParams,
) -> Result<OrderRequest, StrategyError> {
    if quantity == 0 {
        return Err(StrategyError::InvalidQuantity);
    }

    let (take_profit_price, stop_loss_price) = match side {
        OrderSide::Buy => (
            last_price * params.buy_take_profit,
            last_price * params.buy_stop_loss,
        ),
        OrderSide::Sell => (
            last_price * params.sell_take_profit,
            last_price * params.sell_stop_loss,
        ),
    };

    Ok(OrderRequest {
        symbol: symbol.to_string(),
        quantity,
        side,
        take_profit_price,
        stop_loss_price,
    })
}
