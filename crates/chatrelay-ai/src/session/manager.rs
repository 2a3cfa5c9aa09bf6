//! ChatSession struct and conversation log management.

use std::collections::VecDeque;

use tracing::debug;

use crate::model::ModelVariant;
use crate::{Turn, TurnContent};

/// 4096-token context minus headroom for the next request.
pub const DEFAULT_TOKEN_BUDGET: u64 = 4096 - 256;

/// A single conversation: system role, turn log and active model.
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Always sent first; replaced wholesale.
    system_role: Turn,
    /// User and assistant turns, oldest first.
    turns: VecDeque<Turn>,
    model: ModelVariant,
    /// Tokens consumed since the session started. Not cleared by `reset`.
    total_tokens: u64,
    token_budget: u64,
}

impl ChatSession {
    pub fn new(system_role: impl Into<String>, model: ModelVariant) -> Self {
        Self {
            system_role: Turn::system(system_role),
            turns: VecDeque::new(),
            model,
            total_tokens: 0,
            token_budget: DEFAULT_TOKEN_BUDGET,
        }
    }

    pub fn with_token_budget(mut self, budget: u64) -> Self {
        self.token_budget = budget;
        self
    }

    pub fn append_user_turn(&mut self, content: impl Into<TurnContent>) {
        self.turns.push_back(Turn::user(content));
    }

    /// Append the reply to a completed exchange.
    ///
    /// When the running total passes the budget, exactly one turn is
    /// evicted from the front. The budget is soft: a single exchange never
    /// evicts more than one turn.
    pub fn append_assistant_turn(&mut self, content: impl Into<String>, tokens_used: u64) {
        self.turns.push_back(Turn::assistant(content));
        self.total_tokens = self.total_tokens.saturating_add(tokens_used);

        if self.total_tokens > self.token_budget {
            if let Some(evicted) = self.turns.pop_front() {
                debug!(
                    role = evicted.role.as_str(),
                    total_tokens = self.total_tokens,
                    budget = self.token_budget,
                    "evicted oldest turn"
                );
            }
        }
    }

    pub fn set_system_role(&mut self, prompt: impl Into<String>) {
        self.system_role = Turn::system(prompt);
    }

    /// Advance to the next model in the ring and return its identifier.
    pub fn switch_model(&mut self) -> &'static str {
        self.model = self.model.next();
        self.model.identifier()
    }

    /// Clear the turn log. The system role, model and running token total
    /// are kept.
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// Drop the most recent turn, if any.
    pub fn rollback_last_turn(&mut self) -> Option<Turn> {
        self.turns.pop_back()
    }

    /// The system role followed by every turn, oldest first.
    pub fn messages_for_request(&self) -> Vec<Turn> {
        let mut msgs = Vec::with_capacity(self.turns.len() + 1);
        msgs.push(self.system_role.clone());
        msgs.extend(self.turns.iter().cloned());
        msgs
    }

    pub fn system_role(&self) -> &str {
        self.system_role.content.text()
    }

    pub fn model(&self) -> ModelVariant {
        self.model
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn token_budget(&self) -> u64 {
        self.token_budget
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(String::new(), ModelVariant::default())
    }
}
