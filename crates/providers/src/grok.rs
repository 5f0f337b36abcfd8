//! Grok adapter (tool-calling variant).
//!
//! Same `draft_replies` function-calling contract as the OpenAI adapter,
//! plus an optional best-effort trends fetch that seasons the system message
//! with current trending topics. A trends failure never fails the request.

use crate::traits::{missing_credential, sentinel, ReplyProvider};
use crate::util::{draft_replies_tool, draft_replies_tool_choice, from_reqwest, parse_tool_reply};
use rp_context::{build_prompt, Prompt};
use rp_domain::settings::number_or;
use rp_domain::{Error, Message, ReplyResult, Result, Settings, Tone};
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const DEFAULT_API_URL: &str = "https://grok.x.ai/api/chat/completions";
const DEFAULT_MODEL: &str = "grok-1";
const DEFAULT_TEMPERATURE: f64 = 0.5;
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);

const SENTINEL: &str = "(AI API error. Check your key and usage.)";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Reply adapter for the Grok chat completions API.
pub struct GrokProvider {
    settings: Settings,
    api_url: String,
    model: String,
    temperature: f64,
    client: reqwest::Client,
}

impl GrokProvider {
    /// Create the adapter from a settings snapshot.
    pub fn from_settings(settings: &Settings) -> Self {
        let model = if settings.grok_model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            settings.grok_model.clone()
        };

        Self {
            model,
            api_url: DEFAULT_API_URL.to_string(),
            temperature: number_or(&settings.grok_temperature, DEFAULT_TEMPERATURE),
            client: reqwest::Client::new(),
            settings: settings.clone(),
        }
    }

    /// Point the adapter at a different endpoint (proxies, tests).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Best-effort trending-topics fetch.
    ///
    /// Returns an empty string when unconfigured or on any failure; trends
    /// are seasoning, never a dependency.
    async fn fetch_trends(&self) -> String {
        if self.settings.grok_trends_url.is_empty() || self.settings.grok_bearer_token.is_empty() {
            return String::new();
        }

        let resp = self
            .client
            .get(&self.settings.grok_trends_url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(&self.settings.grok_bearer_token)
            .send()
            .await;

        let resp = match resp {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                tracing::warn!(status = resp.status().as_u16(), "failed to fetch trends");
                return String::new();
            }
            Err(e) => {
                tracing::error!(error = %e, "error fetching trends");
                return String::new();
            }
        };

        let json: Value = match resp.json().await {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "error decoding trends");
                return String::new();
            }
        };

        let names: Vec<&str> = json
            .get("trends")
            .and_then(|t| t.as_array())
            .map(|trends| {
                trends
                    .iter()
                    .filter_map(|t| t.get("name").and_then(|n| n.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        if names.is_empty() {
            String::new()
        } else {
            format!("Trending topics: {}", names.join(", "))
        }
    }

    fn build_chat_body(&self, prompt: &Prompt, trends: &str) -> Value {
        let system = if trends.is_empty() {
            prompt.system_instruction.clone()
        } else {
            format!("{}\n\n{}", prompt.system_instruction, trends)
        };

        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt.conversation_text },
                { "role": "user", "content": prompt.instruction_text },
            ],
            "temperature": self.temperature,
            "tools": [draft_replies_tool()],
            "tool_choice": draft_replies_tool_choice(),
        })
    }

    async fn try_generate(
        &self,
        messages: &[Message],
        tone: &str,
        context: &str,
    ) -> Result<ReplyResult> {
        let prompt = build_prompt(&self.settings, &Tone::from(tone), context, messages);
        let trends = self.fetch_trends().await;
        let body = self.build_chat_body(&prompt, &trends);

        tracing::debug!(url = %self.api_url, "sending request to Grok");

        let resp = self
            .client
            .post(&self.api_url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(&self.settings.grok_api_key)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Grok API error");
            return Err(Error::ProviderHttp {
                provider: "grok".into(),
                status: status.as_u16(),
            });
        }

        let json: Value = resp.json().await.map_err(from_reqwest)?;
        parse_tool_reply("grok", &json)
    }
}

#[async_trait::async_trait]
impl ReplyProvider for GrokProvider {
    fn id(&self) -> &'static str {
        "grok"
    }

    fn display_name(&self) -> &'static str {
        "Grok (xAI)"
    }

    async fn generate(&self, messages: &[Message], tone: &str, context: &str) -> ReplyResult {
        if self.settings.grok_api_key.is_empty() {
            tracing::warn!("Grok API key is not set; returning setup instructions");
            return missing_credential("Grok", "GROK_API_KEY");
        }

        match self.try_generate(messages, tone, context).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "failed to get Grok reply");
                sentinel(SENTINEL)
            }
        }
    }
}
