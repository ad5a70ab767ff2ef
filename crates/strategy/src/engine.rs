use common::models::{AccountSnapshot, OrderRequest, OrderSide, SentimentReading};
use serde::Deserialize;

use crate::evaluator::{self, HoldReason, Signal};
use crate::order_builder::{self, StrategyError};
use crate::sizer::position_size;

/// Policy constants of the strategy. The defaults are the tuned values the
/// strategy ships with; no derivation is implied.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyParams {
    pub confidence_threshold: f64,
    pub buy_take_profit: f64,
    pub buy_stop_loss: f64,
    pub sell_take_profit: f64,
    pub sell_stop_loss: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.999,
            buy_take_profit: 1.20,
            buy_stop_loss: 0.95,
            sell_take_profit: 0.80,
            sell_stop_loss: 1.05,
        }
    }
}

/// The one piece of state that survives across ticks.
#[derive(Debug, Default, Clone, Copy)]
struct TradeMemory {
    last_side: Option<OrderSide>,
}

/// What a single tick should do.
#[derive(Debug, Clone, PartialEq)]
pub enum TickPlan {
    Hold(HoldReason),
    Enter {
        /// Liquidate the opposite position before submitting `order`.
        liquidate_first: bool,
        order: OrderRequest,
    },
}

/// The decision core. `plan` is pure; `commit` is the only mutation and is
/// called by the runner strictly after the broker accepted the order, so a
/// failed submission can never poison the flip-protection state.
pub struct SentimentStrategy {
    symbol: String,
    cash_at_risk: f64,
    params: StrategyParams,
    memory: TradeMemory,
}

impl SentimentStrategy {
    pub fn new(symbol: impl Into<String>, cash_at_risk: f64) -> Self {
        Self::with_params(symbol, cash_at_risk, StrategyParams::default())
    }

    pub fn with_params(symbol: impl Into<String>, cash_at_risk: f64, params: StrategyParams) -> Self {
        Self {
            symbol: symbol.into(),
            cash_at_risk,
            params,
            memory: TradeMemory::default(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn last_side(&self) -> Option<OrderSide> {
        self.memory.last_side
    }

    pub fn plan(
        &self,
        account: &AccountSnapshot,
        reading: &SentimentReading,
    ) -> Result<TickPlan, StrategyError> {
        let signal = evaluator::evaluate(
            self.memory.last_side,
            reading,
            account.cash,
            account.last_price,
            self.params.confidence_threshold,
        );

        let (side, liquidate_first) = match signal {
            Signal::Hold(reason) => return Ok(TickPlan::Hold(reason)),
            Signal::Enter {
                side,
                liquidate_first,
            } => (side, liquidate_first),
        };

        let quantity = position_size(account.cash, account.last_price, self.cash_at_risk);
        if quantity == 0 {
            return Ok(TickPlan::Hold(HoldReason::ZeroQuantity));
        }

        let order = order_builder::build_bracket(
            &self.symbol,
            quantity,
            side,
            account.last_price,
            &self.params,
        )?;

        Ok(TickPlan::Enter {
            liquidate_first,
            order,
        })
    }

    /// Record the side of a successfully submitted order.
    pub fn commit(&mut self, side: OrderSide) {
        self.memory.last_side = Some(side);
    }
}
