//! Chat-completion service boundary and the OpenAI-compatible HTTP client.

use async_trait::async_trait;
use serde::Serialize;

use crate::LlmError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body of `POST {base}/chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// A text-completion backend.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Text of `choices[0].message.content`.
pub fn extract_content(body: &serde_json::Value) -> Result<String, LlmError> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| LlmError::InvalidResponse("missing choices[0].message.content".into()))
}

#[cfg(feature = "http")]
pub use http::OpenAiClient;

#[cfg(feature = "http")]
mod http {
    use async_trait::async_trait;
    use tracing::{debug, info};

    use super::{CompletionRequest, CompletionService, extract_content};
    use crate::LlmError;
    use crate::error::classify_status;

    /// OpenAI chat-completions client; any compatible base URL works.
    pub struct OpenAiClient {
        client: reqwest::Client,
        api_key: String,
        base_url: String,
    }

    impl OpenAiClient {
        /// `base_url` like `https://api.openai.com/v1`; a trailing slash is dropped.
        pub fn new(api_key: String, base_url: &str) -> Self {
            Self {
                client: reqwest::Client::new(),
                api_key,
                base_url: base_url.trim_end_matches('/').to_string(),
            }
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }
    }

    #[async_trait]
    impl CompletionService for OpenAiClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            let url = format!("{}/chat/completions", self.base_url);
            info!(url = %url, model = %request.model, temperature = request.temperature, "requesting completion");

            let resp = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(request)
                .send()
                .await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(classify_status(status.as_u16(), body));
            }

            let body: serde_json::Value = resp.json().await?;
            let text = extract_content(&body)?;
            debug!(chars = text.len(), "completion received");
            Ok(text)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn trims_trailing_slash() {
            let client = OpenAiClient::new("sk-test".into(), "https://api.openai.com/v1/");
            assert_eq!(client.base_url(), "https://api.openai.com/v1");
        }
    }
}
