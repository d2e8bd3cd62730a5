use crate::storage::{Database, Feed, NewPost};

use super::normalizer::NormalizedItem;

/// Counts from reconciling one batch of items against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Items present in the fetched document
    pub items_seen: usize,
    /// Items that resulted in a new stored post
    pub created: usize,
}

/// Insert every previously-unseen item as a post.
///
/// Items are processed in source order. An item whose URL is already
/// stored for this feed is a silent skip; an item that fails to insert for
/// any other reason is logged and skipped. One bad item never aborts the
/// rest of the batch.
pub async fn reconcile(db: &Database, feed: &Feed, items: &[NormalizedItem]) -> ReconcileSummary {
    let mut created = 0;

    for item in items {
        let new_post = NewPost {
            feed_id: feed.id,
            title: &item.title,
            url: &item.url,
            description: item.description.as_deref(),
            published_at: item.published_at.map(|dt| dt.timestamp()),
        };

        match db.insert_post_if_absent(new_post).await {
            Ok(true) => created += 1,
            Ok(false) => {
                tracing::debug!(feed = %feed.url, item = %item.url, "post already stored");
            }
            Err(e) => {
                tracing::warn!(feed = %feed.url, item = %item.url, error = %e, "failed to store post");
            }
        }
    }

    ReconcileSummary {
        items_seen: items.len(),
        created,
    }
}
