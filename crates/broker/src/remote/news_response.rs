use serde::Deserialize;

use common::models::NewsHeadline;

/// `GET /v1beta1/news` on the data API. Pagination fields are ignored; a
/// three-day window for one symbol fits comfortably in one page.
#[derive(Debug, Deserialize)]
pub struct NewsResponse {
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
pub struct NewsItem {
    pub headline: String,
}

impl NewsResponse {
    pub fn into_headlines(self) -> Vec<NewsHeadline> {
        self.news
            .into_iter()
            .map(|item| NewsHeadline::new(item.headline))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_news_page() {
        let raw = r#"{"news":[{"id":1,"headline":"Apple beats estimates"},{"id":2,"headline":"iPhone demand surges"}],"next_page_token":null}"#;
        let page: NewsResponse = serde_json::from_str(raw).unwrap();
        let headlines = page.into_headlines();
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].headline, "Apple beats estimates");
    }
}
