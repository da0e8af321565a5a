//! Provider registry and connection settings
//!
//! The registry is a closed enum resolved at compile time; looking a provider
//! up by an unrecognized name is an explicit error, not a silent miss.

use super::client::OpenAiCompatProvider;
use super::{ApiError, ChatProvider};
use serde::{Deserialize, Serialize};

/// The closed set of registered providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    OpenRouter,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::OpenAi, ProviderKind::OpenRouter];

    /// Stable code used for config keys and environment variable prefixes
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenRouter => "openrouter",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::OpenRouter => "OpenRouter",
        }
    }

    /// Base URL the client appends `/v1/...` paths to
    pub fn default_api_base(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com",
            ProviderKind::OpenRouter => "https://openrouter.ai/api",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-3.5-turbo",
            ProviderKind::OpenRouter => "openrouter/auto",
        }
    }

    /// Where a user can create an API key for this provider
    pub fn create_key_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://platform.openai.com/api-keys",
            ProviderKind::OpenRouter => "https://openrouter.ai/keys",
        }
    }

    /// Resolve a provider from its code or display name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self, ApiError> {
        let needle = name.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == needle || kind.display_name().to_ascii_lowercase() == needle)
            .ok_or_else(|| ApiError::UnknownProvider(name.to_string()))
    }
}

/// Connection settings for one provider, owned by the caller.
///
/// Unset fields fall back to the registry defaults for the provider the
/// record is used with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    pub api_base: Option<String>,
    pub model: Option<String>,
    /// HTTP(S) proxy URL; direct connection when unset
    pub proxy: Option<String>,
}

/// Build the provider registered under `kind` with caller-owned settings.
pub fn create_provider(
    kind: ProviderKind,
    config: ProviderConfig,
) -> Result<Box<dyn ChatProvider>, ApiError> {
    // Every registered provider currently speaks the OpenAI-compatible
    // protocol; the match stays exhaustive so a new wire format gets its own
    // adapter rather than a fallthrough.
    match kind {
        ProviderKind::OpenAi | ProviderKind::OpenRouter => {
            Ok(Box::new(OpenAiCompatProvider::new(kind, config)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_resolves_codes_and_display_names() {
        assert_eq!(
            ProviderKind::from_name("openai").unwrap(),
            ProviderKind::OpenAi
        );
        assert_eq!(
            ProviderKind::from_name("OpenRouter").unwrap(),
            ProviderKind::OpenRouter
        );
        assert_eq!(
            ProviderKind::from_name(" OPENROUTER ").unwrap(),
            ProviderKind::OpenRouter
        );
    }

    #[test]
    fn test_from_name_rejects_unknown() {
        let err = ProviderKind::from_name("chatgpt-5000").unwrap_err();
        assert!(matches!(err, ApiError::UnknownProvider(name) if name == "chatgpt-5000"));
    }

    #[test]
    fn test_registry_defaults() {
        assert_eq!(
            ProviderKind::OpenAi.default_api_base(),
            "https://api.openai.com"
        );
        assert_eq!(ProviderKind::OpenAi.default_model(), "gpt-3.5-turbo");
        assert_eq!(
            ProviderKind::OpenRouter.default_api_base(),
            "https://openrouter.ai/api"
        );
        assert_eq!(ProviderKind::OpenRouter.default_model(), "openrouter/auto");
    }

    #[test]
    fn test_create_provider_applies_overrides() {
        let provider = create_provider(
            ProviderKind::OpenRouter,
            ProviderConfig {
                api_key: "sk-test".to_string(),
                api_base: Some("https://gateway.example.com".to_string()),
                model: Some("qwen/qwen3-14b:free".to_string()),
                proxy: None,
            },
        )
        .unwrap();

        assert_eq!(provider.kind(), ProviderKind::OpenRouter);
        assert_eq!(provider.api_base(), "https://gateway.example.com");
        assert_eq!(provider.model(), "qwen/qwen3-14b:free");
    }
}
