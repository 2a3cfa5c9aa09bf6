//! Response formatting and chat-session management for chatrelay.
//!
//! Provides:
//! - `TextChunker`: reflows long replies into message-sized chunks
//!   without breaking fenced code blocks
//! - `CostEstimator`: token usage to USD, rounded to significant digits
//! - `ChatSession`: bounded turn log with a replaceable system role
//! - `ResponseOrchestrator`: one exchange with the provider, with
//!   bounded retries for transient failures
//! - `OpenAiClient`: the chat-completions implementation of `AiClient`

pub mod chunker;
pub mod cost;
pub mod model;
pub mod openai;
pub mod orchestrator;
pub mod session;
pub mod token_tracker;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;

pub use chunker::TextChunker;
pub use cost::{CostEstimator, PricingTable, Rates};
pub use model::ModelVariant;
pub use openai::{OpenAiClient, OpenAiClientConfig};
pub use orchestrator::{Attempt, CompletionResult, NoopObserver, ResponseOrchestrator, RetryObserver};
pub use session::ChatSession;
pub use token_tracker::TokenTracker;

/// Remote chat-completion API.
#[async_trait]
pub trait AiClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[Turn],
        model: ModelVariant,
        max_output_tokens: u32,
    ) -> Result<Completion, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// An inline image attached to a user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl ImageRef {
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            data: B64.encode(bytes),
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnContent {
    Text(String),
    TextWithImage { text: String, image: ImageRef },
}

impl TurnContent {
    /// The text part, ignoring any image.
    pub fn text(&self) -> &str {
        match self {
            TurnContent::Text(text) | TurnContent::TextWithImage { text, .. } => text,
        }
    }

    pub fn has_image(&self) -> bool {
        matches!(self, TurnContent::TextWithImage { .. })
    }
}

impl From<String> for TurnContent {
    fn from(text: String) -> Self {
        TurnContent::Text(text)
    }
}

impl From<&str> for TurnContent {
    fn from(text: &str) -> Self {
        TurnContent::Text(text.to_string())
    }
}

/// One message in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn user(content: impl Into<TurnContent>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Text(text.into()),
        }
    }
}

/// Token counts reported by the provider for one completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Build usage from input/output counts, deriving the total.
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
        }
    }
}

/// A successful completion.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("internal server error: {0}")]
    Server(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Timeouts and server-side failures are worth an immediate retry;
    /// everything else ends the exchange.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Timeout(_) | ProviderError::Server(_))
    }
}
