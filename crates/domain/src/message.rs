//! Conversation data model.
//!
//! Everything here is constructed fresh per request and discarded once the
//! response is returned; the pipeline owns no persistent state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sender
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Who sent a message.
///
/// Derived exactly once from the raw store row (`is_from_me` flag plus the
/// configured contact handle) — never stored ambiguously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Me,
    /// Older exports label the counterpart "partner" or "them"; accept both.
    #[serde(alias = "partner", alias = "them")]
    Contact,
    Unknown,
}

impl Sender {
    /// Derive the sender from a raw row's `is_from_me` flag and the row's
    /// contact id matched against the configured contact handle.
    pub fn derive(is_from_me: bool, contact_id: Option<&str>, contact_handle: &str) -> Self {
        if is_from_me {
            Sender::Me
        } else if contact_id == Some(contact_handle) {
            Sender::Contact
        } else {
            Sender::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::Me => "me",
            Sender::Contact => "contact",
            Sender::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single text message, immutable once fetched.
///
/// Batches are ordered chronologically (oldest first) after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp,
        }
    }

    /// Shape a raw store row into a [`Message`], deriving the sender.
    pub fn from_row(row: MessageRow, contact_handle: &str) -> Self {
        let sender = Sender::derive(row.is_from_me, row.contact_id.as_deref(), contact_handle);
        Self {
            sender,
            text: row.text,
            timestamp: row.timestamp,
        }
    }
}

/// A raw row as returned by the underlying message store.
///
/// The store is an external collaborator; this type only captures the fields
/// the pipeline consumes. Stores typically return rows newest-first, hence
/// the reversal in [`normalize_rows`].
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRow {
    pub is_from_me: bool,
    #[serde(default)]
    pub contact_id: Option<String>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Shape a reverse-chronological row batch into an oldest-first message list.
///
/// A batch consisting solely of the user's own messages yields an empty list:
/// there is nothing to reply to.
pub fn normalize_rows(rows: Vec<MessageRow>, contact_handle: &str) -> Vec<Message> {
    let mut messages: Vec<Message> = rows
        .into_iter()
        .map(|row| Message::from_row(row, contact_handle))
        .collect();
    messages.reverse();

    if has_contact_messages(&messages) {
        messages
    } else {
        Vec::new()
    }
}

/// Whether at least one message in the batch is not from the user.
pub fn has_contact_messages(messages: &[Message]) -> bool {
    messages.iter().any(|m| m.sender != Sender::Me)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tone
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Style directive for generated replies.
///
/// Opaque to the pipeline: it is interpolated into the prompt verbatim and
/// never validated beyond non-emptiness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tone {
    Gentle,
    Funny,
    Reassuring,
    Concise,
    Custom(String),
}

impl Tone {
    pub fn as_str(&self) -> &str {
        match self {
            Tone::Gentle => "gentle",
            Tone::Funny => "funny",
            Tone::Reassuring => "reassuring",
            Tone::Concise => "concise",
            Tone::Custom(s) => s.as_str(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

impl From<&str> for Tone {
    fn from(s: &str) -> Self {
        match s {
            "gentle" => Tone::Gentle,
            "funny" => Tone::Funny,
            "reassuring" => Tone::Reassuring,
            "concise" => Tone::Concise,
            other => Tone::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Results
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The normalized output contract every provider adapter produces.
///
/// `replies` is never null — an empty vector means "no parseable replies".
/// An empty `summary` is the error sentinel: UI-facing callers must treat it
/// as a recoverable failure, not a real summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyResult {
    pub summary: String,
    pub replies: Vec<String>,
    #[serde(rename = "messageCount", skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub message_count: Option<usize>,
}

impl ReplyResult {
    pub fn new(summary: impl Into<String>, replies: Vec<String>) -> Self {
        Self {
            summary: summary.into(),
            replies,
            message_count: None,
        }
    }

    /// Whether this result is the recoverable-failure sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.summary.is_empty()
    }
}

/// A historically similar message snippet from the semantic recall index.
///
/// Read-only; the snippet's lifecycle is owned by the external index. The
/// timestamp stays a plain string because it is only ever rendered back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarMessageSnippet {
    pub text: String,
    pub ts: String,
    pub sender: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn row(is_from_me: bool, contact_id: Option<&str>, text: &str, secs: i64) -> MessageRow {
        MessageRow {
            is_from_me,
            contact_id: contact_id.map(String::from),
            text: text.into(),
            timestamp: ts(secs),
        }
    }

    #[test]
    fn sender_derivation() {
        assert_eq!(Sender::derive(true, Some("+15551234"), "+15551234"), Sender::Me);
        assert_eq!(
            Sender::derive(false, Some("+15551234"), "+15551234"),
            Sender::Contact
        );
        assert_eq!(Sender::derive(false, Some("+19999999"), "+15551234"), Sender::Unknown);
        assert_eq!(Sender::derive(false, None, "+15551234"), Sender::Unknown);
    }

    #[test]
    fn sender_accepts_legacy_labels() {
        let s: Sender = serde_json::from_str("\"partner\"").unwrap();
        assert_eq!(s, Sender::Contact);
        let s: Sender = serde_json::from_str("\"them\"").unwrap();
        assert_eq!(s, Sender::Contact);
        let s: Sender = serde_json::from_str("\"me\"").unwrap();
        assert_eq!(s, Sender::Me);
    }

    #[test]
    fn normalize_rows_reverses_into_chronological_order() {
        let rows = vec![
            row(false, Some("+1555"), "newest", 30),
            row(true, None, "middle", 20),
            row(false, Some("+1555"), "oldest", 10),
        ];
        let messages = normalize_rows(rows, "+1555");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].text, "oldest");
        assert_eq!(messages[2].text, "newest");
        assert_eq!(messages[0].sender, Sender::Contact);
        assert_eq!(messages[1].sender, Sender::Me);
    }

    #[test]
    fn normalize_rows_all_from_me_yields_empty() {
        let rows = vec![row(true, None, "hello", 10), row(true, None, "anyone?", 20)];
        assert!(normalize_rows(rows, "+1555").is_empty());
    }

    #[test]
    fn reply_result_serializes_message_count_as_camel_case() {
        let mut result = ReplyResult::new("sum", vec!["a".into()]);
        result.message_count = Some(4);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["messageCount"], 4);

        let without = ReplyResult::new("sum", vec![]);
        let json = serde_json::to_value(&without).unwrap();
        assert!(json.get("messageCount").is_none());
    }

    #[test]
    fn empty_summary_is_the_sentinel() {
        assert!(ReplyResult::new("", vec!["(error)".into()]).is_sentinel());
        assert!(!ReplyResult::new("fine", vec![]).is_sentinel());
    }

    #[test]
    fn tone_round_trips_known_and_custom_values() {
        assert_eq!(Tone::from("gentle"), Tone::Gentle);
        assert_eq!(Tone::from("gentle").as_str(), "gentle");
        assert_eq!(Tone::from("sarcastic").as_str(), "sarcastic");
        assert!(Tone::Custom("  ".into()).is_empty());
        assert!(!Tone::Concise.is_empty());
    }

    #[test]
    fn message_timestamp_serializes_as_iso8601() {
        let msg = Message::new(Sender::Contact, "hi", ts(1747735200));
        let json = serde_json::to_value(&msg).unwrap();
        let rendered = json["timestamp"].as_str().unwrap();
        assert!(rendered.starts_with("2025-05-20T"));
    }
}
