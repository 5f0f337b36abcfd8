//! Khoj adapter (free-text variant).
//!
//! Khoj runs locally and needs no API key — its "credential" is the chat
//! endpoint URL. The whole prompt goes in a single `q` field and the raw
//! completion comes back at `response`, which the normalizer then parses.

use crate::normalize::{parse_replies, parse_summary};
use crate::traits::{sentinel, ReplyProvider};
use crate::util::from_reqwest;
use rp_context::build_prompt;
use rp_domain::{Error, Message, ReplyResult, Result, Settings, Tone};
use serde_json::Value;

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);

const SENTINEL: &str = "(Sorry, I had trouble generating a response.)";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Reply adapter for a local Khoj chat endpoint.
pub struct KhojProvider {
    settings: Settings,
    client: reqwest::Client,
}

impl KhojProvider {
    /// Create the adapter from a settings snapshot.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Build the chat body. The optional agent id is included only when
    /// configured.
    fn build_chat_body(&self, prompt_text: &str) -> Value {
        let mut body = serde_json::json!({ "q": prompt_text });
        if !self.settings.khoj_agent.is_empty() {
            body["agent"] = Value::String(self.settings.khoj_agent.clone());
        }
        body
    }

    async fn try_generate(
        &self,
        messages: &[Message],
        tone: &str,
        context: &str,
    ) -> Result<ReplyResult> {
        let prompt = build_prompt(&self.settings, &Tone::from(tone), context, messages);
        let body = self.build_chat_body(&prompt.rendered());

        tracing::debug!(url = %self.settings.khoj_api_url, "sending request to Khoj");

        let resp = self
            .client
            .post(&self.settings.khoj_api_url)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "error from Khoj API");
            return Err(Error::ProviderHttp {
                provider: "khoj".into(),
                status: status.as_u16(),
            });
        }

        let json: Value = resp.json().await.map_err(from_reqwest)?;
        let raw_output = json
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or("");

        tracing::debug!(raw_output, "Khoj raw response");

        Ok(ReplyResult {
            summary: parse_summary(raw_output),
            replies: parse_replies(raw_output),
            message_count: Some(messages.len()),
        })
    }
}

#[async_trait::async_trait]
impl ReplyProvider for KhojProvider {
    fn id(&self) -> &'static str {
        "khoj"
    }

    fn display_name(&self) -> &'static str {
        "Khoj (Local)"
    }

    async fn generate(&self, messages: &[Message], tone: &str, context: &str) -> ReplyResult {
        if self.settings.khoj_api_url.is_empty() {
            tracing::warn!("Khoj URL is not set; returning setup instructions");
            return ReplyResult::new(
                "Khoj URL is not configured.",
                vec!["Please set your Khoj chat endpoint (KHOJ_API_URL) in the settings.".into()],
            );
        }

        match self.try_generate(messages, tone, context).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "failed to get Khoj reply");
                let mut result = sentinel(SENTINEL);
                result.message_count = Some(messages.len());
                result
            }
        }
    }
}
