use crate::ai::{Message, MessageRole};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the Anthropic `messages` API
#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    auth_headers: header::HeaderMap,
    endpoint: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ClaudeCompletionRequest {
    model: String,
    messages: Vec<SimpleClaudeMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct SimpleClaudeMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeCompletionResponse {
    #[serde(default)]
    content: Vec<ClaudeResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponseContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
    error: ClaudeError,
}

#[derive(Debug, Deserialize)]
struct ClaudeError {
    message: String,
}

impl ClaudeClient {
    pub fn new(
        api_key: &str,
        endpoint: Option<&str>,
        model: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, String> {
        let mut auth_headers = header::HeaderMap::new();
        auth_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let auth_value = header::HeaderValue::from_str(api_key)
            .map_err(|e| format!("Invalid API key format: {}", e))?;
        auth_headers.insert("x-api-key", auth_value);
        auth_headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static("2023-06-01"),
        );

        Ok(Self {
            client: crate::http::shared_client().clone(),
            auth_headers,
            endpoint: endpoint
                .unwrap_or("https://api.anthropic.com/v1/messages")
                .to_string(),
            model: model.unwrap_or("claude-sonnet-4-20250514").to_string(),
            timeout,
        })
    }

    pub async fn generate_text(&self, messages: Vec<Message>) -> Result<String, String> {
        // The system prompt travels in its own field
        let mut system_message = None;
        let api_messages: Vec<SimpleClaudeMessage> = messages
            .into_iter()
            .filter_map(|m| {
                if m.role == MessageRole::System {
                    system_message = Some(m.content);
                    None
                } else {
                    Some(SimpleClaudeMessage {
                        role: m.role.as_str().to_string(),
                        content: m.content,
                    })
                }
            })
            .collect();

        let request = ClaudeCompletionRequest {
            model: self.model.clone(),
            messages: api_messages,
            max_tokens: 2048,
            system: system_message,
        };

        log::debug!("Sending request to Claude API at {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.auth_headers.clone())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Claude API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(error_response) = serde_json::from_str::<ClaudeErrorResponse>(&error_text) {
                return Err(format!("Claude API error: {}", error_response.error.message));
            }
            return Err(format!(
                "Claude API returned error status: {}, body: {}",
                status, error_text
            ));
        }

        let data: ClaudeCompletionResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Claude response: {}", e))?;

        let text: String = data
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err("Claude API returned no content".to_string());
        }
        Ok(text)
    }
}
