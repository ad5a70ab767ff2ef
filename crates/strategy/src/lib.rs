pub mod engine;
pub mod evaluator;
pub mod order_builder;
pub mod sizer;

pub use engine::{SentimentStrategy, StrategyParams, TickPlan};
pub use evaluator::{HoldReason, Signal};
pub use order_builder::StrategyError;
pub use sizer::position_size;
