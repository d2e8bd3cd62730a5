//! The fetch loop: on a fixed period, pick the least-recently-fetched
//! feed, stamp it, and run it through the fetch pipeline.
//!
//! One cycle handles exactly one feed, and cycles never overlap — a cycle
//! that outruns the interval simply delays the next one. Feeds whose
//! source is unreachable are not retried eagerly: stamping happens before
//! the fetch, so a broken feed rotates to the back of the selection order
//! and every other feed still gets its turn.

use std::time::Duration;
use thiserror::Error;
use tokio::time::MissedTickBehavior;

use crate::feed::{fetch_document, normalize, reconcile, FetchError};
use crate::storage::{Database, StoreError};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid interval {0:?}: expected a positive duration like \"30s\" or \"1m\"")]
    InvalidInterval(String),
}

/// Failure of a single fetch cycle. Always recovered at the loop boundary.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("failed to select next feed: {0}")]
    Select(#[source] StoreError),

    #[error("failed to stamp feed {url}: {source}")]
    Stamp {
        url: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to fetch feed {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
}

/// What one cycle did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The store holds no feeds; nothing to do
    NoFeeds,
    /// One feed was fetched and reconciled
    Completed {
        feed_name: String,
        feed_url: String,
        items_seen: usize,
        created: usize,
    },
}

pub struct Scheduler {
    db: Database,
    client: reqwest::Client,
}

impl Scheduler {
    pub fn new(db: Database, client: reqwest::Client) -> Self {
        Self { db, client }
    }

    /// Run the fetch loop: one cycle immediately, then one per tick.
    ///
    /// Cycles are strictly sequential — the next tick is not consumed
    /// until the current cycle returns, and missed ticks leave no backlog.
    /// Cycle failures are logged and never stop the loop; the only normal
    /// exit is Ctrl-C, checked between cycles.
    pub async fn run(&self, interval: Duration) -> Result<(), SchedulerError> {
        if interval.is_zero() {
            return Err(SchedulerError::InvalidInterval("0s".to_string()));
        }

        tracing::info!(interval_secs = interval.as_secs(), "starting fetch loop");

        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer.tick().await; // the first tick completes immediately

        // Registered once so a Ctrl-C arriving mid-cycle is still seen at
        // the next between-cycles check
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            self.run_cycle_logged().await;

            tokio::select! {
                _ = timer.tick() => {}
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, stopping fetch loop");
                    return Ok(());
                }
            }
        }
    }

    /// One cycle with its outcome reported to the log surface.
    pub async fn run_cycle_logged(&self) {
        match self.run_cycle().await {
            Ok(CycleOutcome::NoFeeds) => {
                tracing::info!("no feeds to fetch");
            }
            Ok(CycleOutcome::Completed {
                feed_name,
                feed_url,
                items_seen,
                created,
            }) => {
                tracing::info!(
                    feed = %feed_name,
                    url = %feed_url,
                    items = items_seen,
                    new_posts = created,
                    "feed processed"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "fetch cycle failed");
            }
        }
    }

    /// One full cycle: select → stamp → fetch → normalize → reconcile.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
        let Some(feed) = self
            .db
            .next_feed_to_fetch()
            .await
            .map_err(CycleError::Select)?
        else {
            return Ok(CycleOutcome::NoFeeds);
        };

        // Stamp before fetching, unconditionally: an unreachable feed must
        // rotate to the back of the order instead of being selected again
        // next cycle.
        self.db
            .mark_feed_fetched(feed.id)
            .await
            .map_err(|source| CycleError::Stamp {
                url: feed.url.clone(),
                source,
            })?;

        let document = fetch_document(&self.client, &feed.url)
            .await
            .map_err(|source| CycleError::Fetch {
                url: feed.url.clone(),
                source,
            })?;

        let items = normalize(document.channel.items);
        let summary = reconcile(&self.db, &feed, &items).await;

        Ok(CycleOutcome::Completed {
            feed_name: feed.name,
            feed_url: feed.url,
            items_seen: summary.items_seen,
            created: summary.created,
        })
    }
}

/// Parse a Go-style duration string ("30s", "1m", "1h30m").
///
/// Units are seconds, minutes and hours; segments add up. A number with no
/// unit, an unknown unit, or a zero total is rejected — a mistyped
/// interval must abort startup rather than silently poll at some default.
pub fn parse_interval(input: &str) -> Result<Duration, SchedulerError> {
    let invalid = || SchedulerError::InvalidInterval(input.to_string());
    let s = input.trim();
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total_secs: u64 = 0;
    let mut value: Option<u64> = None;

    for c in s.chars() {
        match c {
            '0'..='9' => {
                let digit = u64::from(c) - u64::from('0');
                value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(digit));
            }
            's' | 'm' | 'h' => {
                let v = value.take().ok_or_else(invalid)?;
                let unit_secs = match c {
                    's' => 1,
                    'm' => 60,
                    _ => 3600,
                };
                total_secs = total_secs.saturating_add(v.saturating_mul(unit_secs));
            }
            _ => return Err(invalid()),
        }
    }

    // A trailing number without a unit is ambiguous; zero is not a period
    if value.is_some() || total_secs == 0 {
        return Err(invalid());
    }

    Ok(Duration::from_secs(total_secs))
}
