use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use mockall::Sequence;
use mockall::mock;

use broker::{HistoricalData, HistoricalGateway};
use common::models::{NewsHeadline, OrderFill, OrderRequest, OrderSide, SentimentLabel, SentimentReading};
use common::traits::{BrokerGateway, SentimentOracle};
use executor::runner::{TickOutcome, run_tick};
use executor::services::TradeRecorder;
use strategy::{HoldReason, SentimentStrategy};

mock! {
    pub Gateway {}

    #[async_trait]
    impl BrokerGateway for Gateway {
        async fn get_cash(&self) -> anyhow::Result<f64>;
        async fn get_last_price(&self, symbol: &str) -> anyhow::Result<f64>;
        async fn get_news(
            &self,
            symbol: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> anyhow::Result<Vec<NewsHeadline>>;
        async fn submit_order(&self, order: &OrderRequest) -> anyhow::Result<OrderFill>;
        async fn liquidate_all(&self, symbol: &str) -> anyhow::Result<()>;
    }
}

mock! {
    pub Oracle {}

    #[async_trait]
    impl SentimentOracle for Oracle {
        async fn score(&self, headlines: &[NewsHeadline]) -> anyhow::Result<SentimentReading>;
    }
}

fn temp_log() -> PathBuf {
    std::env::temp_dir().join(format!("itrader_engine_{}.log", uuid::Uuid::new_v4()))
}

fn tick_instant(date: &str) -> chrono::DateTime<chrono::Utc> {
    date.parse::<NaiveDate>()
        .unwrap()
        .and_time(NaiveTime::MIN)
        .and_utc()
}

fn filled(qty: f64, price: f64) -> OrderFill {
    OrderFill {
        status: "filled".to_string(),
        filled_qty: qty,
        filled_avg_price: price,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn end_to_end_buy_then_flip_to_short() {
    let log = temp_log();
    let recorder = TradeRecorder::new(log.clone());
    let mut strategy = SentimentStrategy::new("AAPL", 0.5);

    let mut gateway = MockGateway::new();
    let mut oracle = MockOracle::new();
    let mut seq = Sequence::new();

    gateway.expect_get_cash().times(2).returning(|| Ok(10_000.0));
    gateway
        .expect_get_last_price()
        .times(2)
        .returning(|_| Ok(200.0));
    gateway
        .expect_get_news()
        .times(2)
        .withf(|symbol, start, end| {
            symbol == "AAPL"
                && *end == "2024-05-06".parse::<NaiveDate>().unwrap()
                && *start == "2024-05-03".parse::<NaiveDate>().unwrap()
        })
        .returning(|_, _, _| Ok(vec![NewsHeadline::new("Apple earnings")]));

    oracle
        .expect_score()
        .times(1)
        .returning(|_| {
            Ok(SentimentReading {
                label: SentimentLabel::Positive,
                probability: 0.9995,
            })
        });
    oracle
        .expect_score()
        .times(1)
        .returning(|_| {
            Ok(SentimentReading {
                label: SentimentLabel::Negative,
                probability: 0.9999,
            })
        });

    // tick 1: plain buy, no liquidation
    gateway
        .expect_submit_order()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|order| {
            order.side == OrderSide::Buy
                && order.quantity == 25
                && close(order.take_profit_price, 240.0)
                && close(order.stop_loss_price, 190.0)
        })
        .returning(|order| Ok(filled(order.quantity as f64, 200.0)));

    // tick 2: flip protection must liquidate before the short entry
    gateway
        .expect_liquidate_all()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    gateway
        .expect_submit_order()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|order| {
            order.side == OrderSide::Sell
                && order.quantity == 25
                && close(order.take_profit_price, 160.0)
                && close(order.stop_loss_price, 210.0)
        })
        .returning(|order| Ok(filled(order.quantity as f64, 200.0)));

    let now = tick_instant("2024-05-06");

    let first = run_tick(&mut strategy, &gateway, &oracle, &recorder, now)
        .await
        .unwrap();
    match first {
        TickOutcome::Traded {
            liquidated_first, ..
        } => assert!(!liquidated_first),
        other => panic!("expected trade, got {:?}", other),
    }
    assert_eq!(strategy.last_side(), Some(OrderSide::Buy));

    let second = run_tick(&mut strategy, &gateway, &oracle, &recorder, now)
        .await
        .unwrap();
    match second {
        TickOutcome::Traded {
            liquidated_first, ..
        } => assert!(liquidated_first),
        other => panic!("expected trade, got {:?}", other),
    }
    assert_eq!(strategy.last_side(), Some(OrderSide::Sell));

    let content = tokio::fs::read_to_string(&log).await.unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "Trade executed: AAPL, 25 shares at 200, status: filled"
    );

    let _ = tokio::fs::remove_file(&log).await;
}

#[tokio::test]
async fn failed_submission_does_not_commit_memory() {
    let log = temp_log();
    let recorder = TradeRecorder::new(log.clone());
    let mut strategy = SentimentStrategy::new("AAPL", 0.5);

    let mut gateway = MockGateway::new();
    let mut oracle = MockOracle::new();

    gateway.expect_get_cash().returning(|| Ok(10_000.0));
    gateway.expect_get_last_price().returning(|_| Ok(200.0));
    gateway
        .expect_get_news()
        .returning(|_, _, _| Ok(vec![NewsHeadline::new("headline")]));
    gateway
        .expect_submit_order()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("insufficient buying power")));
    gateway.expect_liquidate_all().never();

    oracle.expect_score().returning(|_| {
        Ok(SentimentReading {
            label: SentimentLabel::Positive,
            probability: 0.9995,
        })
    });

    let result = run_tick(
        &mut strategy,
        &gateway,
        &oracle,
        &recorder,
        tick_instant("2024-05-06"),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(strategy.last_side(), None);
    assert!(tokio::fs::read_to_string(&log).await.is_err());
}

#[tokio::test]
async fn neutral_ticks_are_idempotent_no_ops() {
    let log = temp_log();
    let recorder = TradeRecorder::new(log.clone());
    let mut strategy = SentimentStrategy::new("AAPL", 0.5);

    let mut gateway = MockGateway::new();
    let mut oracle = MockOracle::new();

    gateway.expect_get_cash().returning(|| Ok(10_000.0));
    gateway.expect_get_last_price().returning(|_| Ok(200.0));
    gateway.expect_get_news().returning(|_, _, _| Ok(vec![]));
    gateway.expect_submit_order().never();
    gateway.expect_liquidate_all().never();

    oracle
        .expect_score()
        .returning(|_| Ok(SentimentReading::neutral()));

    for _ in 0..3 {
        let outcome = run_tick(
            &mut strategy,
            &gateway,
            &oracle,
            &recorder,
            tick_instant("2024-05-06"),
        )
        .await
        .unwrap();
        assert_eq!(outcome, TickOutcome::Held(HoldReason::LowConfidence));
        assert_eq!(strategy.last_side(), None);
    }

    // nothing was ever appended
    assert!(tokio::fs::read_to_string(&log).await.is_err());
}

fn parity_data() -> HistoricalData {
    serde_json::from_str(
        r#"{
            "bars": [
                {"date": "2024-05-01", "close": 100.0},
                {"date": "2024-05-02", "close": 100.0},
                {"date": "2024-05-03", "close": 100.0}
            ],
            "news": [
                {"date": "2024-05-03", "headline": "Blowout quarter"}
            ]
        }"#,
    )
    .unwrap()
}

fn scripted_oracle() -> MockOracle {
    let mut oracle = MockOracle::new();
    oracle.expect_score().returning(|headlines| {
        Ok(if headlines.is_empty() {
            SentimentReading::neutral()
        } else {
            SentimentReading {
                label: SentimentLabel::Positive,
                probability: 0.9995,
            }
        })
    });
    oracle
}

#[tokio::test]
async fn backtest_and_live_replay_agree() {
    let dates = ["2024-05-01", "2024-05-02", "2024-05-03"];

    // backtest side: historical gateway over the data file
    let bt_gateway = HistoricalGateway::new(
        "AAPL",
        parity_data(),
        100_000.0,
        dates[0].parse().unwrap(),
    );
    let bt_oracle = scripted_oracle();
    let bt_recorder = TradeRecorder::new(temp_log());
    let mut bt_strategy = SentimentStrategy::new("AAPL", 0.5);

    let mut bt_outcomes = Vec::new();
    for date in dates {
        bt_gateway.advance_to(date.parse().unwrap()).await;
        let outcome = run_tick(
            &mut bt_strategy,
            &bt_gateway,
            &bt_oracle,
            &bt_recorder,
            tick_instant(date),
        )
        .await
        .unwrap();
        bt_outcomes.push(outcome);
    }

    // live side: a mock broker scripted with the identical state sequence
    let mut live_gateway = MockGateway::new();
    live_gateway
        .expect_get_cash()
        .times(3)
        .returning(|| Ok(100_000.0));
    live_gateway
        .expect_get_last_price()
        .times(3)
        .returning(|_| Ok(100.0));
    live_gateway
        .expect_get_news()
        .times(2)
        .returning(|_, _, _| Ok(vec![]));
    live_gateway
        .expect_get_news()
        .times(1)
        .returning(|_, _, _| Ok(vec![NewsHeadline::new("Blowout quarter")]));
    live_gateway
        .expect_submit_order()
        .times(1)
        .returning(|order| Ok(filled(order.quantity as f64, 100.0)));
    live_gateway.expect_liquidate_all().never();

    let live_oracle = scripted_oracle();
    let live_recorder = TradeRecorder::new(temp_log());
    let mut live_strategy = SentimentStrategy::new("AAPL", 0.5);

    let mut live_outcomes = Vec::new();
    for date in dates {
        let outcome = run_tick(
            &mut live_strategy,
            &live_gateway,
            &live_oracle,
            &live_recorder,
            tick_instant(date),
        )
        .await
        .unwrap();
        live_outcomes.push(outcome);
    }

    assert_eq!(bt_outcomes, live_outcomes);
    assert_eq!(bt_strategy.last_side(), live_strategy.last_side());

    // both replays entered long 500 shares on the news day
    match &bt_outcomes[2] {
        TickOutcome::Traded { order, .. } => {
            assert_eq!(order.side, OrderSide::Buy);
            assert_eq!(order.quantity, 500);
        }
        other => panic!("expected trade on the news day, got {:?}", other),
    }
}
