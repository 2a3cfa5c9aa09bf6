//! Conversation session management.
//!
//! A `ChatSession` holds the system role, the ordered user/assistant
//! turns, the active model and a running token total used to keep the
//! history roughly within the model's context window.

mod manager;

#[cfg(test)]
mod tests;

pub use manager::{ChatSession, DEFAULT_TOKEN_BUDGET};
