//! Platform-neutral view of the chat service the bot lives on.

use std::collections::HashMap;

use async_trait::async_trait;
use chatrelay_common::PlatformError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub filename: String,
    pub content_type: Option<String>,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image"))
    }
}

/// A user message delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: String,
    pub channel_id: String,
    pub author: Author,
    pub content: String,
    pub attachments: Vec<Attachment>,
}

/// Handle to a message the bot posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: String,
    pub channel_id: String,
}

/// A slash-command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub id: String,
    /// Token used to answer the interaction.
    pub token: String,
    pub name: String,
    pub options: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    Ready {
        user_id: String,
        application_id: String,
    },
    Message(InboundMessage),
    Command(CommandInvocation),
}

/// Outbound operations the handler needs from the platform.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Reply to `to` without pinging its author.
    async fn reply(&self, to: &InboundMessage, content: &str) -> Result<SentMessage, PlatformError>;

    async fn send(&self, channel_id: &str, content: &str) -> Result<SentMessage, PlatformError>;

    async fn delete(&self, message: &SentMessage) -> Result<(), PlatformError>;

    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, PlatformError>;

    async fn respond_to_command(
        &self,
        invocation: &CommandInvocation,
        content: &str,
    ) -> Result<(), PlatformError>;

    /// Publish the bot's slash commands for `application_id`.
    async fn register_commands(&self, application_id: &str) -> Result<(), PlatformError>;
}
