//! Immutable configuration snapshot.
//!
//! The surrounding application owns settings persistence; the pipeline only
//! consumes a snapshot of plain-string values taken at request time. Updating
//! settings means producing a new snapshot, never mutating one in place, so
//! concurrent requests can read without coordination.

use serde::{Deserialize, Serialize};

/// Plain-string settings snapshot.
///
/// Every field is a string exactly as stored; numeric overrides are parsed
/// leniently at the point of use (empty or malformed means "not set").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Handle of the contact the conversation is with.
    pub contact_handle: String,
    /// Hours of prior conversation history to fetch as context.
    pub history_lookback_hours: String,
    /// Free-text persona directive prepended to every prompt.
    pub custom_context: String,

    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_temperature: String,
    pub openai_top_p: String,
    pub openai_frequency_penalty: String,
    pub openai_presence_penalty: String,

    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub anthropic_temperature: String,

    pub grok_api_key: String,
    pub grok_model: String,
    pub grok_temperature: String,
    pub grok_trends_url: String,
    pub grok_bearer_token: String,

    pub khoj_api_url: String,
    pub khoj_agent: String,

    /// Vector-match endpoint for semantic recall (blank disables recall).
    pub recall_match_url: String,
    pub recall_match_key: String,
}

impl Settings {
    /// Build a snapshot from process environment variables.
    ///
    /// Unset variables become empty strings, which downstream code treats as
    /// "not configured".
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self {
            contact_handle: var("CONTACT_HANDLE"),
            history_lookback_hours: var("HISTORY_LOOKBACK_HOURS"),
            custom_context: var("CUSTOM_CONTEXT"),
            openai_api_key: var("OPENAI_API_KEY"),
            openai_model: var("OPENAI_MODEL"),
            openai_temperature: var("OPENAI_TEMPERATURE"),
            openai_top_p: var("OPENAI_TOP_P"),
            openai_frequency_penalty: var("OPENAI_FREQUENCY_PENALTY"),
            openai_presence_penalty: var("OPENAI_PRESENCE_PENALTY"),
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            anthropic_model: var("ANTHROPIC_MODEL"),
            anthropic_temperature: var("ANTHROPIC_TEMPERATURE"),
            grok_api_key: var("GROK_API_KEY"),
            grok_model: var("GROK_MODEL"),
            grok_temperature: var("GROK_TEMPERATURE"),
            grok_trends_url: var("GROK_TRENDS_URL"),
            grok_bearer_token: var("GROK_BEARER_TOKEN"),
            khoj_api_url: var("KHOJ_API_URL"),
            khoj_agent: var("KHOJ_AGENT"),
            recall_match_url: var("RECALL_MATCH_URL"),
            recall_match_key: var("RECALL_MATCH_KEY"),
        }
    }

    /// Lookback hours parsed for the time-window resolver.
    ///
    /// Empty or malformed values parse to `0.0`, which the resolver treats as
    /// "skip history fetch".
    pub fn lookback_hours(&self) -> f64 {
        self.history_lookback_hours.trim().parse().unwrap_or(0.0)
    }
}

/// Parse an optional numeric setting.
///
/// Returns `None` for empty or malformed strings so callers can omit the
/// parameter from wire bodies entirely. Some provider APIs interpret an
/// explicit `0` as "disable this feature", which is not the same as unset.
pub fn opt_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Parse a numeric setting with a documented default.
pub fn number_or(value: &str, default: f64) -> f64 {
    opt_number(value).unwrap_or(default)
}
