use common::models::{OrderSide, SentimentLabel, SentimentReading};

/// Why a tick produced no entry. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    /// `cash <= last_price`: not enough capital for even one share.
    InsufficientCash,
    /// Neutral label, or probability at or below the confidence threshold.
    LowConfidence,
    /// Qualifying signal but the sized quantity came out as zero.
    ZeroQuantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Hold(HoldReason),
    Enter {
        side: OrderSide,
        /// Flip protection: an opposite-side position is open and must be
        /// liquidated before the new entry.
        liquidate_first: bool,
    },
}

/// The decision ladder. Pure: depends only on its arguments, mutates
/// nothing, and emits at most one entry side per tick.
pub fn evaluate(
    last_side: Option<OrderSide>,
    reading: &SentimentReading,
    cash: f64,
    last_price: f64,
    threshold: f64,
) -> Signal {
    if cash <= last_price {
        return Signal::Hold(HoldReason::InsufficientCash);
    }

    match reading.label {
        SentimentLabel::Positive if reading.probability > threshold => Signal::Enter {
            side: OrderSide::Buy,
            liquidate_first: last_side == Some(OrderSide::Sell),
        },
        SentimentLabel::Negative if reading.probability > threshold => Signal::Enter {
            side: OrderSide::Sell,
            liquidate_first: last_side == Some(OrderSide::Buy),
        },
        _ => Signal::Hold(HoldReason::LowConfidence),
    }
}
