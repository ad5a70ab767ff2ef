pub mod account_response;
pub mod alpaca_client;
pub mod news_response;
pub mod order_response;
pub mod trade_response;

pub use account_response::AccountResponse;
pub use alpaca_client::{AlpacaClient, AlpacaError, BrokerCredentials};
pub use news_response::NewsResponse;
pub use order_response::OrderResponse;
pub use trade_response::LatestTradeResponse;
