//! History fetch boundary.
//!
//! The message store itself (timestamp epochs, SQL, ordering) belongs to the
//! surrounding application; the pipeline only consumes the [`HistoryFetcher`]
//! contract. History failures degrade to an empty contribution and never fail
//! the overall request.

use chrono::{DateTime, Utc};
use rp_domain::{Message, Result};

use crate::window::resolve_window;

/// External collaborator providing prior messages for a time interval.
///
/// Implementations must return messages ordered oldest-first; the pipeline
/// does not re-derive timestamp semantics.
#[async_trait::async_trait]
pub trait HistoryFetcher: Send + Sync {
    async fn query_history(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Message>>;
}

/// Fetcher that always returns nothing, for callers that opt out of history.
pub struct NoHistory;

#[async_trait::async_trait]
impl HistoryFetcher for NoHistory {
    async fn query_history(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<Message>> {
        Ok(Vec::new())
    }
}

/// Fetch the history window anchored at the earliest active message.
///
/// Returns an empty vector when the lookback is unset, the batch is empty,
/// or the fetch fails — the never-fail contract lives in this signature.
pub async fn relevant_history(
    fetcher: &dyn HistoryFetcher,
    active: &[Message],
    lookback_hours: f64,
) -> Vec<Message> {
    let Some(anchor) = active.first() else {
        tracing::warn!("no active messages; skipping history fetch");
        return Vec::new();
    };

    let Some(window) = resolve_window(anchor.timestamp, lookback_hours) else {
        tracing::warn!(lookback_hours, "lookback unset; skipping history fetch");
        return Vec::new();
    };

    match fetcher.query_history(window.start, window.end).await {
        Ok(history) => {
            if history.is_empty() {
                tracing::debug!("no messages found in history window");
            } else {
                tracing::debug!(count = history.len(), "history messages found");
            }
            history
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch history context");
            Vec::new()
        }
    }
}
