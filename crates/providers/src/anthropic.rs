//! Anthropic adapter (free-text variant).
//!
//! The Messages API returns a single free-text completion; the response
//! normalizer extracts the summary and replies from the marker format the
//! prompt requests.

use crate::normalize::{parse_replies, parse_summary};
use crate::traits::{missing_credential, sentinel, ReplyProvider};
use crate::util::from_reqwest;
use rp_context::build_prompt;
use rp_domain::settings::number_or;
use rp_domain::{Error, Message, ReplyResult, Result, Settings, Tone};
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
const DEFAULT_TEMPERATURE: f64 = 0.5;
const MAX_TOKENS: u32 = 1024;
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);

const SENTINEL: &str = "(AI API error. Check your key and usage.)";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Reply adapter for the Anthropic Messages API.
pub struct AnthropicProvider {
    settings: Settings,
    api_url: String,
    model: String,
    temperature: f64,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Create the adapter from a settings snapshot.
    pub fn from_settings(settings: &Settings) -> Self {
        let model = if settings.anthropic_model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            settings.anthropic_model.clone()
        };

        Self {
            model,
            api_url: DEFAULT_API_URL.to_string(),
            temperature: number_or(&settings.anthropic_temperature, DEFAULT_TEMPERATURE),
            client: reqwest::Client::new(),
            settings: settings.clone(),
        }
    }

    /// Point the adapter at a different endpoint (proxies, tests).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn build_messages_body(&self, prompt_text: &str) -> Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt_text }],
        })
    }

    async fn try_generate(
        &self,
        messages: &[Message],
        tone: &str,
        context: &str,
    ) -> Result<ReplyResult> {
        let prompt = build_prompt(&self.settings, &Tone::from(tone), context, messages);
        let body = self.build_messages_body(&prompt.rendered());

        tracing::debug!(url = %self.api_url, "sending request to Anthropic");

        let resp = self
            .client
            .post(&self.api_url)
            .timeout(REQUEST_TIMEOUT)
            .header("x-api-key", &self.settings.anthropic_api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Anthropic API error");
            return Err(Error::ProviderHttp {
                provider: "anthropic".into(),
                status: status.as_u16(),
            });
        }

        let json: Value = resp.json().await.map_err(from_reqwest)?;
        Ok(normalize_response(&json))
    }
}

/// Pull the raw completion text out of the response and normalize it.
fn normalize_response(body: &Value) -> ReplyResult {
    let raw_output = body
        .get("content")
        .and_then(|c| c.get(0))
        .and_then(|block| block.get("text"))
        .and_then(|t| t.as_str())
        .unwrap_or("");

    tracing::debug!(raw_output, "Anthropic raw response");

    ReplyResult::new(parse_summary(raw_output), parse_replies(raw_output))
}

#[async_trait::async_trait]
impl ReplyProvider for AnthropicProvider {
    fn id(&self) -> &'static str {
        "anthropic"
    }

    fn display_name(&self) -> &'static str {
        "Anthropic (Claude)"
    }

    async fn generate(&self, messages: &[Message], tone: &str, context: &str) -> ReplyResult {
        if self.settings.anthropic_api_key.is_empty() {
            tracing::warn!("Anthropic API key is not set; returning setup instructions");
            return missing_credential("Anthropic", "ANTHROPIC_API_KEY");
        }

        match self.try_generate(messages, tone, context).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "failed to get Anthropic reply");
                sentinel(SENTINEL)
            }
        }
    }
}
