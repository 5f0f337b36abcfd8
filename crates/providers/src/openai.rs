//! OpenAI adapter (tool-calling variant).
//!
//! Sends the chat completion with a forced `draft_replies` function call so
//! the model returns `{summary, replies[]}` as structured JSON — no
//! free-text extraction on the success path.

use crate::traits::{missing_credential, sentinel, ReplyProvider};
use crate::util::{draft_replies_tool, draft_replies_tool_choice, from_reqwest, parse_tool_reply};
use rp_context::{build_prompt, Prompt};
use rp_domain::settings::{number_or, opt_number};
use rp_domain::{Error, Message, ReplyResult, Result, Settings, Tone};
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_TEMPERATURE: f64 = 0.5;
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);

const SENTINEL: &str = "(Sorry, I had trouble generating a response.)";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Reply adapter for the OpenAI chat completions API.
pub struct OpenAiProvider {
    settings: Settings,
    base_url: String,
    model: String,
    temperature: f64,
    top_p: Option<f64>,
    frequency_penalty: Option<f64>,
    presence_penalty: Option<f64>,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Create the adapter from a settings snapshot.
    pub fn from_settings(settings: &Settings) -> Self {
        let model = if settings.openai_model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            settings.openai_model.clone()
        };

        Self {
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: number_or(&settings.openai_temperature, DEFAULT_TEMPERATURE),
            top_p: opt_number(&settings.openai_top_p),
            frequency_penalty: opt_number(&settings.openai_frequency_penalty),
            presence_penalty: opt_number(&settings.openai_presence_penalty),
            client: reqwest::Client::new(),
            settings: settings.clone(),
        }
    }

    /// Point the adapter at an OpenAI-compatible endpoint other than the
    /// hosted API (self-hosted gateways, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the chat completions body.
    ///
    /// Optional sampling parameters are included only when explicitly
    /// configured: the API reads an explicit `0` as "disable this feature",
    /// which is not the same as unset.
    fn build_chat_body(&self, prompt: &Prompt) -> Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system_instruction },
                { "role": "user", "content": prompt.conversation_text },
                { "role": "user", "content": prompt.instruction_text },
            ],
            "temperature": self.temperature,
            "tools": [draft_replies_tool()],
            "tool_choice": draft_replies_tool_choice(),
        });

        if let Some(top_p) = self.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }
        if let Some(penalty) = self.frequency_penalty {
            body["frequency_penalty"] = serde_json::json!(penalty);
        }
        if let Some(penalty) = self.presence_penalty {
            body["presence_penalty"] = serde_json::json!(penalty);
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
        let body = self.build_chat_body(&prompt);
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(url = %url, "sending request to OpenAI");

        let resp = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(&self.settings.openai_api_key)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "OpenAI API error");
            return Err(Error::ProviderHttp {
                provider: "openai".into(),
                status: status.as_u16(),
            });
        }

        let json: Value = resp.json().await.map_err(from_reqwest)?;
        parse_tool_reply("openai", &json)
    }
}

#[async_trait::async_trait]
impl ReplyProvider for OpenAiProvider {
    fn id(&self) -> &'static str {
        "openai"
    }

    fn display_name(&self) -> &'static str {
        "OpenAI (GPT)"
    }

    async fn generate(&self, messages: &[Message], tone: &str, context: &str) -> ReplyResult {
        if self.settings.openai_api_key.is_empty() {
            tracing::warn!("OpenAI API key is not set; returning setup instructions");
            return missing_credential("OpenAI", "OPENAI_API_KEY");
        }

        match self.try_generate(messages, tone, context).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "failed to get OpenAI reply");
                sentinel(SENTINEL)
            }
        }
    }
}
