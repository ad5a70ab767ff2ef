pub mod account;
pub mod news;
pub mod order;
pub mod sentiment;

pub use account::AccountSnapshot;
pub use news::NewsHeadline;
pub use order::{OrderFill, OrderRequest, OrderSide};
pub use sentiment::{SentimentLabel, SentimentReading};
