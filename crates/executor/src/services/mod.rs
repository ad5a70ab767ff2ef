pub mod log_viewer;
pub mod trade_recorder;
pub mod trader_service;

pub use log_viewer::LogViewerService;
pub use trade_recorder::TradeRecorder;
pub use trader_service::TraderService;
