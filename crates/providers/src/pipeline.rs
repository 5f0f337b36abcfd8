//! The suggestion pipeline orchestrator.
//!
//! One request, one flow: pick a provider, gather the auxiliary context
//! (history window and semantic recall, concurrently — neither depends on
//! the other), assemble the context string, dispatch the adapter, return its
//! normalized result. Auxiliary failures degrade to empty contributions;
//! only a missing-provider configuration propagates as an error.

use crate::registry::ProviderRegistry;
use rp_context::{
    assemble_context, merge_history, relevant_history, similar_snippets, HistoryFetcher,
    SemanticRecall,
};
use rp_domain::{Error, Message, ReplyResult, Result, Settings};
use std::sync::Arc;

/// Snippets requested from semantic recall per generation.
const RECALL_K: usize = 5;

/// Orchestrates one reply-generation request end to end.
///
/// Holds only immutable configuration and shared collaborator handles, so
/// concurrent invocations need no coordination.
pub struct SuggestionPipeline {
    settings: Settings,
    registry: ProviderRegistry,
    history: Arc<dyn HistoryFetcher>,
    recall: Arc<dyn SemanticRecall>,
}

impl SuggestionPipeline {
    pub fn new(
        settings: Settings,
        history: Arc<dyn HistoryFetcher>,
        recall: Arc<dyn SemanticRecall>,
    ) -> Self {
        let registry = ProviderRegistry::new(&settings);
        Self {
            settings,
            registry,
            history,
            recall,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Generate a summary and candidate replies for the active batch.
    ///
    /// `messages` must be oldest-first; `provider_override` selects a
    /// specific provider id, otherwise the registry default applies.
    /// Errors surface only for boundary preconditions (empty tone/batch,
    /// unknown provider id) and [`Error::NoProviderConfigured`].
    pub async fn suggest(
        &self,
        messages: &[Message],
        tone: &str,
        extra_context: &str,
        provider_override: Option<&str>,
    ) -> Result<ReplyResult> {
        if tone.trim().is_empty() {
            return Err(Error::Config("tone must not be empty".into()));
        }
        if messages.is_empty() {
            return Err(Error::Config("no messages to reply to".into()));
        }

        let provider_id = match provider_override {
            Some(id) => id,
            None => self.registry.default_provider()?,
        };
        let provider = self
            .registry
            .create(provider_id)
            .ok_or_else(|| Error::Config(format!("unknown provider '{provider_id}'")))?;

        // Latest message drives the recall query; the conversation thread is
        // keyed by the configured contact handle.
        let query = messages.last().map(|m| m.text.as_str()).unwrap_or("");
        let lookback = self.settings.lookback_hours();

        let (history, snippets) = tokio::join!(
            relevant_history(self.history.as_ref(), messages, lookback),
            similar_snippets(
                self.recall.as_ref(),
                query,
                &self.settings.contact_handle,
                RECALL_K,
            ),
        );

        let conversation = merge_history(history, messages);
        let context = assemble_context(extra_context, &snippets);

        tracing::info!(
            provider = provider_id,
            messages = conversation.len(),
            snippets = snippets.len(),
            "dispatching reply generation"
        );

        Ok(provider.generate(&conversation, tone, &context).await)
    }
}
