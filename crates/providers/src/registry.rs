//! Provider registry.
//!
//! A derived view over the settings snapshot: which providers are usable
//! right now, which one to use by default, and a factory keyed by the same
//! string discriminant the surrounding application passes around. Computed
//! fresh per query; nothing here outlives the request.

use crate::anthropic::AnthropicProvider;
use crate::grok::GrokProvider;
use crate::khoj::KhojProvider;
use crate::openai::OpenAiProvider;
use crate::traits::ReplyProvider;
use rp_domain::{Error, Result, Settings};
use std::sync::Arc;

/// Fixed registry order; also the default-selection tiebreak order.
const PROVIDER_ORDER: [(&str, &str); 4] = [
    ("khoj", "Khoj (Local)"),
    ("openai", "OpenAI (GPT)"),
    ("anthropic", "Anthropic (Claude)"),
    ("grok", "Grok (xAI)"),
];

/// A provider as seen by provider pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub credential_present: bool,
}

/// Registry over the configured providers.
pub struct ProviderRegistry {
    settings: Settings,
}

impl ProviderRegistry {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// The credential/config value that gates each provider. Khoj runs
    /// locally, so its URL is the credential.
    fn credential_for(&self, id: &str) -> &str {
        match id {
            "khoj" => &self.settings.khoj_api_url,
            "openai" => &self.settings.openai_api_key,
            "anthropic" => &self.settings.anthropic_api_key,
            "grok" => &self.settings.grok_api_key,
            _ => "",
        }
    }

    /// All providers whose credential is configured, in registry order.
    pub fn available_providers(&self) -> Vec<ProviderInfo> {
        PROVIDER_ORDER
            .iter()
            .filter(|(id, _)| !self.credential_for(id).is_empty())
            .map(|&(id, display_name)| ProviderInfo {
                id,
                display_name,
                credential_present: true,
            })
            .collect()
    }

    /// Pick the default provider id.
    ///
    /// Khoj wins when available (local, keyless); otherwise the first
    /// available provider in registry order. With nothing configured this is
    /// the one genuine error the pipeline propagates — callers surface a
    /// "please configure a provider" state, never a crash.
    pub fn default_provider(&self) -> Result<&'static str> {
        let available = self.available_providers();
        if available.is_empty() {
            return Err(Error::NoProviderConfigured);
        }
        if let Some(khoj) = available.iter().find(|p| p.id == "khoj") {
            return Ok(khoj.id);
        }
        Ok(available[0].id)
    }

    /// Whether a provider picker is worth showing at all.
    pub fn has_multiple_providers(&self) -> bool {
        self.available_providers().len() > 1
    }

    /// Instantiate the adapter for a provider id.
    ///
    /// Returns `None` for unknown ids. A known-but-unconfigured provider is
    /// still constructed — its `generate` answers with setup instructions.
    pub fn create(&self, id: &str) -> Option<Arc<dyn ReplyProvider>> {
        let provider: Arc<dyn ReplyProvider> = match id {
            "khoj" => Arc::new(KhojProvider::from_settings(&self.settings)),
            "openai" => Arc::new(OpenAiProvider::from_settings(&self.settings)),
            "anthropic" => Arc::new(AnthropicProvider::from_settings(&self.settings)),
            "grok" => Arc::new(GrokProvider::from_settings(&self.settings)),
            _ => return None,
        };
        Some(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with(khoj: bool, openai: bool, anthropic: bool, grok: bool) -> Settings {
        Settings {
            khoj_api_url: if khoj { "http://localhost:42110/api/chat".into() } else { String::new() },
            openai_api_key: if openai { "sk-x".into() } else { String::new() },
            anthropic_api_key: if anthropic { "key".into() } else { String::new() },
            grok_api_key: if grok { "xai".into() } else { String::new() },
            ..Default::default()
        }
    }

    #[test]
    fn availability_tracks_configured_credentials() {
        let registry = ProviderRegistry::new(&settings_with(true, false, true, false));
        let available = registry.available_providers();
        let ids: Vec<_> = available.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["khoj", "anthropic"]);
        assert!(available.iter().all(|p| p.credential_present));
    }

    #[test]
    fn khoj_wins_the_default_when_available() {
        let registry = ProviderRegistry::new(&settings_with(true, true, false, false));
        assert_eq!(registry.default_provider().unwrap(), "khoj");
    }

    #[test]
    fn first_available_wins_without_khoj() {
        let registry = ProviderRegistry::new(&settings_with(false, true, false, false));
        assert_eq!(registry.default_provider().unwrap(), "openai");

        let registry = ProviderRegistry::new(&settings_with(false, false, false, true));
        assert_eq!(registry.default_provider().unwrap(), "grok");
    }

    #[test]
    fn no_providers_configured_is_an_error() {
        let registry = ProviderRegistry::new(&settings_with(false, false, false, false));
        let err = registry.default_provider().unwrap_err();
        assert!(matches!(err, Error::NoProviderConfigured));
    }

    #[test]
    fn has_multiple_providers_needs_at_least_two() {
        assert!(!ProviderRegistry::new(&settings_with(true, false, false, false))
            .has_multiple_providers());
        assert!(ProviderRegistry::new(&settings_with(true, true, false, false))
            .has_multiple_providers());
    }

    #[test]
    fn factory_covers_every_registered_id_and_rejects_unknown() {
        let registry = ProviderRegistry::new(&settings_with(true, true, true, true));
        for (id, _) in PROVIDER_ORDER {
            let provider = registry.create(id).unwrap();
            assert_eq!(provider.id(), id);
        }
        assert!(registry.create("gemini").is_none());
    }
}
