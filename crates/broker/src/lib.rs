pub mod backtest;
pub mod remote;
pub mod sentiment;

pub use backtest::{HistoricalData, HistoricalGateway};
pub use remote::{AlpacaClient, BrokerCredentials};
pub use sentiment::RemoteSentimentOracle;
