//! Integration tests for the suggestion pipeline — full round-trip with
//! in-process collaborator stubs and a loopback provider endpoint. No
//! external services; everything here is deterministic.

use chrono::{DateTime, TimeZone, Utc};
use rp_context::{HistoryFetcher, NoRecall, SemanticRecall};
use rp_domain::{Error, Message, Result, Sender, Settings, SimilarMessageSnippet};
use rp_providers::SuggestionPipeline;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn msg(sender: Sender, text: &str, secs: i64) -> Message {
    Message::new(sender, text, Utc.timestamp_opt(secs, 0).unwrap())
}

fn active_batch() -> Vec<Message> {
    vec![msg(Sender::Contact, "are we still on for tonight?", 1_000_000)]
}

/// Settings where only the (loopback, connection-refused) Khoj endpoint is
/// configured. Any dispatched generation deterministically yields the Khoj
/// sentinel without leaving the process.
fn khoj_only_settings() -> Settings {
    Settings {
        khoj_api_url: "http://127.0.0.1:1/api/chat".into(),
        contact_handle: "+15551234".into(),
        history_lookback_hours: "4".into(),
        ..Default::default()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Collaborator stubs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct CountingHistory {
    calls: AtomicUsize,
    result: Vec<Message>,
    fail: bool,
}

impl CountingHistory {
    fn empty() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            result: Vec::new(),
            fail: false,
        }
    }

    fn with(result: Vec<Message>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            result,
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            result: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait::async_trait]
impl HistoryFetcher for CountingHistory {
    async fn query_history(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<Message>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(Error::Http("message store offline".into()))
        } else {
            Ok(self.result.clone())
        }
    }
}

struct FailingRecall;

#[async_trait::async_trait]
impl SemanticRecall for FailingRecall {
    async fn find_similar(
        &self,
        _query: &str,
        _thread_id: &str,
        _k: usize,
    ) -> Result<Vec<SimilarMessageSnippet>> {
        Err(Error::Http("index offline".into()))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Provider selection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn no_provider_configured_propagates() {
    let pipeline = SuggestionPipeline::new(
        Settings::default(),
        Arc::new(CountingHistory::empty()),
        Arc::new(NoRecall),
    );

    let err = pipeline
        .suggest(&active_batch(), "gentle", "", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoProviderConfigured));
}

#[tokio::test]
async fn unknown_provider_override_is_rejected() {
    let pipeline = SuggestionPipeline::new(
        khoj_only_settings(),
        Arc::new(CountingHistory::empty()),
        Arc::new(NoRecall),
    );

    let err = pipeline
        .suggest(&active_batch(), "gentle", "", Some("gemini"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn override_routes_to_the_named_provider() {
    // Khoj is the configured default; overriding to the unconfigured OpenAI
    // adapter must hit its deterministic missing-credential short-circuit.
    let pipeline = SuggestionPipeline::new(
        khoj_only_settings(),
        Arc::new(CountingHistory::empty()),
        Arc::new(NoRecall),
    );

    let result = pipeline
        .suggest(&active_batch(), "gentle", "", Some("openai"))
        .await
        .unwrap();
    assert_eq!(result.summary, "OpenAI API key is not configured.");
    assert!(!result.replies.is_empty());
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Boundary preconditions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn empty_tone_is_rejected() {
    let pipeline = SuggestionPipeline::new(
        khoj_only_settings(),
        Arc::new(CountingHistory::empty()),
        Arc::new(NoRecall),
    );

    let err = pipeline
        .suggest(&active_batch(), "  ", "", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let pipeline = SuggestionPipeline::new(
        khoj_only_settings(),
        Arc::new(CountingHistory::empty()),
        Arc::new(NoRecall),
    );

    let err = pipeline.suggest(&[], "gentle", "", None).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Auxiliary fetch behavior
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn unset_lookback_skips_the_history_fetch() {
    let history = Arc::new(CountingHistory::empty());
    let settings = Settings {
        history_lookback_hours: String::new(),
        ..khoj_only_settings()
    };
    let pipeline = SuggestionPipeline::new(settings, history.clone(), Arc::new(NoRecall));

    let result = pipeline
        .suggest(&active_batch(), "gentle", "", None)
        .await
        .unwrap();

    assert_eq!(history.calls.load(Ordering::SeqCst), 0);
    // Dispatch still happened (connection-refused Khoj sentinel).
    assert!(result.is_sentinel());
}

#[tokio::test]
async fn positive_lookback_queries_the_store_once() {
    let history = Arc::new(CountingHistory::empty());
    let pipeline =
        SuggestionPipeline::new(khoj_only_settings(), history.clone(), Arc::new(NoRecall));

    pipeline
        .suggest(&active_batch(), "gentle", "", None)
        .await
        .unwrap();

    assert_eq!(history.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn auxiliary_failures_never_fail_the_request() {
    let pipeline = SuggestionPipeline::new(
        khoj_only_settings(),
        Arc::new(CountingHistory::failing()),
        Arc::new(FailingRecall),
    );

    // Both auxiliary calls fail; the request still reaches the provider.
    let result = pipeline
        .suggest(&active_batch(), "gentle", "", None)
        .await
        .unwrap();
    assert!(result.is_sentinel());
    // Khoj counts only the active batch: failed history contributed nothing.
    assert_eq!(result.message_count, Some(1));
}

#[tokio::test]
async fn merged_history_reaches_the_provider() {
    let history = Arc::new(CountingHistory::with(vec![
        msg(Sender::Me, "earlier note", 100),
        // Exact duplicate of the active message; must be dropped.
        msg(Sender::Contact, "are we still on for tonight?", 200),
    ]));
    let pipeline =
        SuggestionPipeline::new(khoj_only_settings(), history, Arc::new(NoRecall));

    let result = pipeline
        .suggest(&active_batch(), "gentle", "", None)
        .await
        .unwrap();

    // Khoj reports the conversation length it was handed: one history
    // message survived dedup plus the active message.
    assert_eq!(result.message_count, Some(2));
}
