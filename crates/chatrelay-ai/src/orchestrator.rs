//! One user message in, a list of reply chunks out.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::chunker::TextChunker;
use crate::cost::CostEstimator;
use crate::session::ChatSession;
use crate::token_tracker::TokenTracker;
use crate::{AiClient, ProviderError, TurnContent};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2000;

/// Final outcome of an exchange, as delivered to the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResult {
    pub is_error: bool,
    /// Reply chunks on success, error descriptions on failure.
    pub payload: Vec<String>,
}

impl CompletionResult {
    pub fn success(chunks: Vec<String>) -> Self {
        Self {
            is_error: false,
            payload: chunks,
        }
    }

    pub fn error(messages: Vec<String>) -> Self {
        Self {
            is_error: true,
            payload: messages,
        }
    }
}

/// Outcome of a single remote call.
#[derive(Debug)]
pub enum Attempt {
    Reply(Vec<String>),
    Retryable(ProviderError),
    Fatal(ProviderError),
}

/// Told about each retryable failure that will be retried.
#[async_trait]
pub trait RetryObserver: Send {
    async fn on_retry(&mut self, remaining: u32, error: &ProviderError);
}

/// Observer that ignores retries.
pub struct NoopObserver;

#[async_trait]
impl RetryObserver for NoopObserver {
    async fn on_retry(&mut self, _remaining: u32, _error: &ProviderError) {}
}

/// Drives exchanges between a [`ChatSession`] and an [`AiClient`].
pub struct ResponseOrchestrator {
    session: ChatSession,
    client: Arc<dyn AiClient>,
    chunker: TextChunker,
    estimator: CostEstimator,
    tracker: TokenTracker,
    max_output_tokens: u32,
    max_retries: u32,
}

impl ResponseOrchestrator {
    pub fn new(session: ChatSession, client: Arc<dyn AiClient>) -> Self {
        Self {
            session,
            client,
            chunker: TextChunker::default(),
            estimator: CostEstimator::default(),
            tracker: TokenTracker::new(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_chunker(mut self, chunker: TextChunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn with_estimator(mut self, estimator: CostEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }

    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Run one remote call for `content`.
    ///
    /// The user turn is appended first. A server-side error rolls back the
    /// most recent turn since the provider may have rejected the payload.
    pub async fn attempt(&mut self, content: TurnContent) -> Attempt {
        self.session.append_user_turn(content);

        let messages = self.session.messages_for_request();
        let model = self.session.model();
        let result = self
            .client
            .complete(&messages, model, self.max_output_tokens)
            .await;

        match result {
            Ok(completion) => {
                let mut chunks = self.chunker.split(&completion.text);
                let usage = completion.usage;
                let cost = self
                    .estimator
                    .estimate(usage.input_tokens, usage.output_tokens, model);
                chunks.push(format!("(USAGE: {cost} USD)"));

                info!(model = %model, "assistant: {}", completion.text);
                self.session
                    .append_assistant_turn(completion.text, usage.total_tokens);
                self.tracker.record(model, &usage, cost);
                info!(
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    cost_usd = cost,
                    session_tokens = self.session.total_tokens(),
                    turns = self.session.turn_count(),
                    spend_usd = self.tracker.spend_usd(),
                    "exchange complete"
                );
                Attempt::Reply(chunks)
            }
            Err(e) if e.is_retryable() => {
                warn!(error = %e, "retryable provider error");
                if matches!(e, ProviderError::Server(_)) {
                    self.session.rollback_last_turn();
                }
                Attempt::Retryable(e)
            }
            Err(e) => {
                warn!(error = %e, "provider error");
                Attempt::Fatal(e)
            }
        }
    }

    /// Run an exchange with bounded, immediate retries.
    ///
    /// Every retryable failure uses up one of `max_retries` attempts; the
    /// observer hears about each one that will be retried. Exhausting the
    /// attempts, or any fatal error, yields an error result carrying the
    /// last error's description.
    pub async fn respond(
        &mut self,
        content: TurnContent,
        observer: &mut dyn RetryObserver,
    ) -> CompletionResult {
        let mut remaining = self.max_retries;
        loop {
            match self.attempt(content.clone()).await {
                Attempt::Reply(chunks) => return CompletionResult::success(chunks),
                Attempt::Fatal(e) => return CompletionResult::error(vec![e.to_string()]),
                Attempt::Retryable(e) => {
                    remaining = remaining.saturating_sub(1);
                    if remaining == 0 {
                        return CompletionResult::error(vec![e.to_string()]);
                    }
                    observer.on_retry(remaining, &e).await;
                }
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.session.reset();
    }

    pub fn switch_model(&mut self) -> &'static str {
        self.session.switch_model()
    }

    pub fn set_system_role(&mut self, prompt: impl Into<String>) {
        self.session.set_system_role(prompt);
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn tracker(&self) -> &TokenTracker {
        &self.tracker
    }
}
