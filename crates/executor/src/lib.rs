pub mod actors;
pub mod backtest;
pub mod config;
pub mod runner;
pub mod services;
