//! OpenAI chat-completions client.
//!
//! Implements the `AiClient` trait over `POST {api_base}/chat/completions`
//! with bearer-token authentication.

mod api;
mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::OpenAiClient;
pub use config::OpenAiClientConfig;
