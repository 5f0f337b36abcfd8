use rp_domain::{Message, ReplyResult};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core adapter trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Trait that every reply-generation adapter must implement.
///
/// `generate` never fails: every missing-credential, network, HTTP-status,
/// and parse failure is converted internally into a well-formed
/// [`ReplyResult`] — either the deterministic setup-instruction result (no
/// network attempted) or the provider's error sentinel (`summary` empty,
/// one human-readable placeholder reply).
#[async_trait::async_trait]
pub trait ReplyProvider: Send + Sync {
    /// Stable identifier used for registry selection ("khoj", "openai", ...).
    fn id(&self) -> &'static str;

    /// Human-readable name for provider pickers.
    fn display_name(&self) -> &'static str;

    /// Generate a summary and candidate replies for the conversation.
    async fn generate(&self, messages: &[Message], tone: &str, context: &str) -> ReplyResult;
}

/// Build an error sentinel: empty summary, one placeholder reply.
pub(crate) fn sentinel(reply: &str) -> ReplyResult {
    ReplyResult::new("", vec![reply.to_string()])
}

/// Build the deterministic missing-credential result for a provider.
///
/// Distinct from a runtime failure: the summary names the missing key and
/// the reply carries setup instructions, and no network call is attempted.
pub(crate) fn missing_credential(provider_name: &str, setting: &str) -> ReplyResult {
    ReplyResult::new(
        format!("{provider_name} API key is not configured."),
        vec![format!(
            "Please set up your {provider_name} API key ({setting}) in the settings."
        )],
    )
}
