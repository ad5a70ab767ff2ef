use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsHeadline {
    pub headline: String,
}

impl NewsHeadline {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
        }
    }
}
