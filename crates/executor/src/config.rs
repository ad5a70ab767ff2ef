use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

use broker::BrokerCredentials;

const DEFAULT_LIVE_SYMBOL: &str = "SPY";
const DEFAULT_BACKTEST_SYMBOL: &str = "AAPL";
const DEFAULT_CASH_AT_RISK: f64 = 0.5;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
const DEFAULT_TICK_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TRADE_LOG: &str = "logs/itrader_log.txt";
const DEFAULT_SENTIMENT_URL: &str = "http://127.0.0.1:9000";
const DEFAULT_BACKTEST_CASH: f64 = 100_000.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Live,
    Backtest,
}

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub data_path: PathBuf,
    pub starting_cash: f64,
}

/// Everything the process needs, gathered from the environment exactly
/// once at startup. Nothing downstream reads env vars ad hoc.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub symbol: String,
    pub cash_at_risk: f64,
    pub poll_interval: Duration,
    pub tick_timeout: Duration,
    pub trade_log: PathBuf,
    pub sentiment_url: String,
    pub credentials: Option<BrokerCredentials>,
    pub backtest: Option<BacktestConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode = match env::var("MODE") {
            Ok(raw) => parse_mode(&raw)?,
            Err(_) => Mode::Live,
        };

        let symbol = env::var("SYMBOL").unwrap_or_else(|_| {
            match mode {
                Mode::Live => DEFAULT_LIVE_SYMBOL,
                Mode::Backtest => DEFAULT_BACKTEST_SYMBOL,
            }
            .to_string()
        });

        let cash_at_risk = parse_f64("CASH_AT_RISK", DEFAULT_CASH_AT_RISK)?;
        if !(cash_at_risk > 0.0 && cash_at_risk <= 1.0) {
            return Err(ConfigError::Invalid {
                key: "CASH_AT_RISK",
                value: cash_at_risk.to_string(),
            });
        }

        let poll_interval =
            Duration::from_secs(parse_u64("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?);
        let tick_timeout =
            Duration::from_secs(parse_u64("TICK_TIMEOUT_SECS", DEFAULT_TICK_TIMEOUT_SECS)?);

        let trade_log =
            PathBuf::from(env::var("TRADE_LOG").unwrap_or_else(|_| DEFAULT_TRADE_LOG.to_string()));
        let sentiment_url =
            env::var("SENTIMENT_URL").unwrap_or_else(|_| DEFAULT_SENTIMENT_URL.to_string());

        let credentials = match mode {
            Mode::Live => Some(BrokerCredentials {
                api_key: env::var("API_KEY").map_err(|_| ConfigError::Missing("API_KEY"))?,
                api_secret: env::var("API_SECRET")
                    .map_err(|_| ConfigError::Missing("API_SECRET"))?,
                paper: parse_bool("PAPER", true)?,
            }),
            Mode::Backtest => None,
        };

        let backtest = match mode {
            Mode::Live => None,
            Mode::Backtest => {
                let start = parse_date("BACKTEST_START")?;
                let end = parse_date("BACKTEST_END")?;
                if end < start {
                    return Err(ConfigError::Invalid {
                        key: "BACKTEST_END",
                        value: format!("{} precedes BACKTEST_START {}", end, start),
                    });
                }
                Some(BacktestConfig {
                    start,
                    end,
                    data_path: PathBuf::from(
                        env::var("BACKTEST_DATA")
                            .map_err(|_| ConfigError::Missing("BACKTEST_DATA"))?,
                    ),
                    starting_cash: parse_f64("BACKTEST_CASH", DEFAULT_BACKTEST_CASH)?,
                })
            }
        };

        Ok(Self {
            mode,
            symbol,
            cash_at_risk,
            poll_interval,
            tick_timeout,
            trade_log,
            sentiment_url,
            credentials,
            backtest,
        })
    }
}

fn parse_mode(raw: &str) -> Result<Mode, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "live" | "paper" => Ok(Mode::Live),
        "backtest" => Ok(Mode::Backtest),
        _ => Err(ConfigError::Invalid {
            key: "MODE",
            value: raw.to_string(),
        }),
    }
}

fn parse_f64(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<f64>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

fn parse_date(key: &'static str) -> Result<NaiveDate, ConfigError> {
    let raw = env::var(key).map_err(|_| ConfigError::Missing(key))?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| ConfigError::Invalid { key, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_strings() {
        assert_eq!(parse_mode("live").unwrap(), Mode::Live);
        assert_eq!(parse_mode("paper").unwrap(), Mode::Live);
        assert_eq!(parse_mode("Backtest").unwrap(), Mode::Backtest);
        assert!(parse_mode("replay").is_err());
    }
}
