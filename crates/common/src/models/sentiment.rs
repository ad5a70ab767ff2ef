use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// Sentiment over a headline window. `probability` is the model's
/// confidence in `label`, in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentReading {
    pub label: SentimentLabel,
    pub probability: f64,
}

impl SentimentReading {
    /// Zero-confidence neutral reading, used when there is no news to score.
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            probability: 0.0,
        }
    }
}
