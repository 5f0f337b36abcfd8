//! Lookback window resolution.

use chrono::{DateTime, Duration, Utc};

/// A concrete `[start, end)` interval for the history query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Resolve a lookback duration and an anchor timestamp into a query window.
///
/// Returns `None` when `lookback_hours` is zero, negative, or not finite;
/// callers treat that as "skip the history fetch", not as an error.
///
/// `end` lands 1ms before the anchor so the anchor message never appears in
/// its own context. All instants are UTC; no timezone conversion happens here.
///
/// A finite but absurdly large lookback clamps `start` to the representable
/// floor instead of overflowing — the window simply covers everything.
pub fn resolve_window(anchor: DateTime<Utc>, lookback_hours: f64) -> Option<LookbackWindow> {
    if !lookback_hours.is_finite() || lookback_hours <= 0.0 {
        return None;
    }

    let end = anchor - Duration::milliseconds(1);
    let span_ms = (lookback_hours * 3_600_000.0) as i64;
    let start = end
        .checked_sub_signed(Duration::milliseconds(span_ms))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    Some(LookbackWindow { start, end })
}
