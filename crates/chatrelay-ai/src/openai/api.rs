//! AiClient trait implementation for OpenAiClient.

use async_trait::async_trait;
use tracing::debug;

use crate::model::ModelVariant;
use crate::{AiClient, Completion, ProviderError, Turn};

use super::client::OpenAiClient;

#[async_trait]
impl AiClient for OpenAiClient {
    async fn complete(
        &self,
        messages: &[Turn],
        model: ModelVariant,
        max_output_tokens: u32,
    ) -> Result<Completion, ProviderError> {
        let body = self.build_request_body(messages, model, max_output_tokens);

        debug!(model = %model, messages = messages.len(), "OpenAI API request");

        let response = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            let detail = format!("HTTP {status}: {text}");
            return Err(if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                ProviderError::RateLimited(detail)
            } else if status.is_server_error() {
                ProviderError::Server(detail)
            } else {
                ProviderError::Api(detail)
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Parse(e.to_string())
                }
            })?;

        self.parse_response(json)
    }
}

fn classify_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}
