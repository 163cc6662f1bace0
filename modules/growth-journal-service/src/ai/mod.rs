pub mod claude;
pub mod openai;

pub use claude::ClaudeClient;
pub use openai::OpenAIClient;

use crate::config::ProviderConfig;
use growth_journal_types::EnrichmentProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Text-generation client for whichever provider the caller picked
pub enum AiClient {
    OpenAI(OpenAIClient),
    Claude(ClaudeClient),
}

impl AiClient {
    /// Build a client for `provider`. Fails when the provider has no API key.
    pub fn from_config(
        provider: EnrichmentProvider,
        settings: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Self, String> {
        let api_key = settings
            .api_key
            .as_deref()
            .ok_or_else(|| format!("Provider '{}' is not configured", provider.as_str()))?;

        match provider {
            EnrichmentProvider::OpenAi => Ok(AiClient::OpenAI(OpenAIClient::new(
                api_key,
                settings.endpoint.as_deref(),
                settings.model.as_deref(),
                timeout,
            )?)),
            EnrichmentProvider::Claude => Ok(AiClient::Claude(ClaudeClient::new(
                api_key,
                settings.endpoint.as_deref(),
                settings.model.as_deref(),
                timeout,
            )?)),
        }
    }

    pub fn provider(&self) -> EnrichmentProvider {
        match self {
            AiClient::OpenAI(_) => EnrichmentProvider::OpenAi,
            AiClient::Claude(_) => EnrichmentProvider::Claude,
        }
    }

    pub async fn generate_text(&self, messages: Vec<Message>) -> Result<String, String> {
        match self {
            AiClient::OpenAI(client) => client.generate_text(messages).await,
            AiClient::Claude(client) => client.generate_text(messages).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_provider_is_rejected() {
        let result = AiClient::from_config(
            EnrichmentProvider::Claude,
            &ProviderConfig::default(),
            Duration::from_secs(5),
        );
        match result {
            Err(e) => assert!(e.contains("claude")),
            Ok(_) => panic!("expected an error for a provider without an API key"),
        }
    }

    #[test]
    fn test_configured_provider() {
        let settings = ProviderConfig {
            api_key: Some("sk-test".to_string()),
            endpoint: Some("http://127.0.0.1:1/v1/chat/completions".to_string()),
            model: None,
        };
        let client =
            AiClient::from_config(EnrichmentProvider::OpenAi, &settings, Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.provider(), EnrichmentProvider::OpenAi);
    }
}
