//! Feed acquisition pipeline: fetch a document, normalize its entries,
//! reconcile them against the store.
//!
//! - [`fetcher`] — one HTTP GET per feed with a bounded timeout, decoded
//!   into the raw [`document`] shape
//! - [`normalizer`] — pure transform from raw entries to canonical items
//! - [`reconciler`] — idempotent insertion of previously-unseen items
//!
//! The scheduler (in [`crate::scheduler`]) drives these stages once per
//! cycle for a single feed.

mod document;
mod fetcher;
mod normalizer;
mod reconciler;

pub use document::{Channel, FeedDocument, RawItem};
pub use fetcher::{client, fetch_document, FetchError, USER_AGENT};
pub use normalizer::{normalize, NormalizedItem};
pub use reconciler::{reconcile, ReconcileSummary};
