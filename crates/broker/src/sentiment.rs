use anyhow::bail;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use common::models::{NewsHeadline, SentimentLabel, SentimentReading};
use common::traits::SentimentOracle;

/// Client for the headline scoring service (a FinBERT-style model behind
/// HTTP). The model itself is an external collaborator; this is plumbing.
pub struct RemoteSentimentOracle {
    http: Client,
    base_url: String,
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    headlines: Vec<&'a str>,
}

#[derive(Deserialize)]
struct ScoreResponse {
    probability: f64,
    sentiment: String,
}

impl RemoteSentimentOracle {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }
}

fn parse_label(raw: &str) -> anyhow::Result<SentimentLabel> {
    match raw {
        "positive" => Ok(SentimentLabel::Positive),
        "negative" => Ok(SentimentLabel::Negative),
        "neutral" => Ok(SentimentLabel::Neutral),
        other => bail!("unknown sentiment label: {}", other),
    }
}

#[async_trait]
impl SentimentOracle for RemoteSentimentOracle {
    async fn score(&self, headlines: &[NewsHeadline]) -> anyhow::Result<SentimentReading> {
        if headlines.is_empty() {
            debug!("No headlines in window; scoring as neutral");
            return Ok(SentimentReading::neutral());
        }

        let request = ScoreRequest {
            headlines: headlines.iter().map(|h| h.headline.as_str()).collect(),
        };

        let url = format!("{}/score", self.base_url);
        let resp = self.http.post(&url).json(&request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("sentiment service returned {}: {}", status, body);
        }

        let scored = resp.json::<ScoreResponse>().await?;
        let label = parse_label(&scored.sentiment)?;

        Ok(SentimentReading {
            label,
            probability: scored.probability.clamp(0.0, 1.0),
        })
    }
}
