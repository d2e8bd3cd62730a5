use chrono::{DateTime, Utc};

use super::document::RawItem;

/// A feed entry in canonical shape: decoded text and a parsed publish
/// time, independent of how the source document encoded either.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItem {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Convert raw entries into their canonical shape. Pure; preserves source
/// order.
pub fn normalize(items: Vec<RawItem>) -> Vec<NormalizedItem> {
    items
        .into_iter()
        .map(|item| NormalizedItem {
            published_at: item.pub_date.as_deref().and_then(parse_publish_date),
            title: item.title,
            url: item.link,
            description: item.description,
        })
        .collect()
}

/// Publish dates follow the RFC 822 shape RSS mandates
/// ("Mon, 06 Jan 2025 10:00:00 +0000"). Anything else means the item has
/// no usable publish time — that is data, not an error.
fn parse_publish_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
