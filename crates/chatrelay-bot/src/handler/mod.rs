//! Routes platform events into the response orchestrator.
//!
//! The handler owns the orchestrator exclusively; events are processed one
//! at a time by whichever task drives [`Handler::dispatch`].

pub mod commands;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chatrelay_ai::{ImageRef, ProviderError, ResponseOrchestrator, RetryObserver, TurnContent};
use chatrelay_common::PlatformError;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::platform::{ChatPlatform, InboundMessage, PlatformEvent};

pub const GENERATING: &str = "Generating...";
pub const NO_CONTENT: &str = "No question content.";

/// Discord's per-message character limit.
pub const DEFAULT_MESSAGE_LIMIT: usize = 2000;

/// Why [`Handler::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Shutdown,
    EventsClosed,
}

pub struct Handler {
    orchestrator: ResponseOrchestrator,
    platform: Arc<dyn ChatPlatform>,
    channel_id: String,
    bot_user_id: Option<String>,
    message_limit: usize,
    register_commands: bool,
}

impl Handler {
    pub fn new(
        orchestrator: ResponseOrchestrator,
        platform: Arc<dyn ChatPlatform>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator,
            platform,
            channel_id: channel_id.into(),
            bot_user_id: None,
            message_limit: DEFAULT_MESSAGE_LIMIT,
            register_commands: true,
        }
    }

    pub fn with_message_limit(mut self, limit: usize) -> Self {
        self.message_limit = limit;
        self
    }

    /// Whether slash commands are registered when the platform is ready.
    pub fn with_command_registration(mut self, enabled: bool) -> Self {
        self.register_commands = enabled;
        self
    }

    pub fn orchestrator(&self) -> &ResponseOrchestrator {
        &self.orchestrator
    }

    /// Process events until the channel closes or `shutdown` resolves.
    ///
    /// Shutdown is observed while waiting and while an event is handled,
    /// so a slow exchange does not hold it up.
    pub async fn run(
        &mut self,
        events: &mut mpsc::Receiver<PlatformEvent>,
        shutdown: impl Future<Output = ()>,
    ) -> Exit {
        tokio::pin!(shutdown);
        loop {
            let event = tokio::select! {
                event = events.recv() => event,
                () = &mut shutdown => return Exit::Shutdown,
            };
            let Some(event) = event else {
                return Exit::EventsClosed;
            };
            tokio::select! {
                () = self.dispatch(event) => {}
                () = &mut shutdown => return Exit::Shutdown,
            }
        }
    }

    pub async fn dispatch(&mut self, event: PlatformEvent) {
        match event {
            PlatformEvent::Ready {
                user_id,
                application_id,
            } => self.on_ready(user_id, application_id).await,
            PlatformEvent::Message(message) => self.on_message(message).await,
            PlatformEvent::Command(invocation) => self.on_command(invocation).await,
        }
    }

    /// Record the bot's own user id and register slash commands.
    pub async fn on_ready(&mut self, user_id: String, application_id: String) {
        info!(user_id = %user_id, channel_id = %self.channel_id, "Bot is ready");
        self.bot_user_id = Some(user_id);
        if self.register_commands {
            if let Err(e) = self.platform.register_commands(&application_id).await {
                warn!(error = %e, "Failed to register slash commands");
            }
        }
    }

    fn accepts(&self, message: &InboundMessage) -> bool {
        if message.author.bot || self.bot_user_id.as_deref() == Some(message.author.id.as_str()) {
            return false;
        }
        message.channel_id == self.channel_id
    }

    /// Relay a user message. Failures are reported back to the channel.
    pub async fn on_message(&mut self, message: InboundMessage) {
        if !self.accepts(&message) {
            return;
        }

        if let Err(e) = self.relay(&message).await {
            error!(error = %e, message_id = %message.id, "Failed to handle message");
            let notice = if e.is_delivery() {
                format!("Discord API error occurred.\n{e}")
            } else {
                format!("An error occurred.\n{e}")
            };
            let notice = clamp(&notice, self.message_limit);
            if let Err(e) = self.platform.reply(&message, &notice).await {
                error!(error = %e, "Failed to report error to channel");
            }
        }
    }

    async fn relay(&mut self, message: &InboundMessage) -> Result<(), PlatformError> {
        let platform = Arc::clone(&self.platform);
        let placeholder = platform.reply(message, GENERATING).await?;

        if message.content.trim().is_empty() {
            platform.delete(&placeholder).await?;
            platform.send(&message.channel_id, NO_CONTENT).await?;
            return Ok(());
        }

        let content = self.build_content(message).await?;
        info!(has_image = content.has_image(), "user: {}", content.text());

        let mut notifier = RetryNotifier {
            platform: platform.as_ref(),
            message,
            limit: self.message_limit,
        };
        let result = self.orchestrator.respond(content, &mut notifier).await;

        platform.delete(&placeholder).await?;
        if result.is_error {
            let notice = format!("OpenAI API error occurred.\n{}", result.payload.join("\n"));
            platform
                .reply(message, &clamp(&notice, self.message_limit))
                .await?;
            return Ok(());
        }
        for chunk in &result.payload {
            platform.reply(message, chunk).await?;
        }
        Ok(())
    }

    /// Text plus, when the model takes images, the last image attachment.
    async fn build_content(&self, message: &InboundMessage) -> Result<TurnContent, PlatformError> {
        let text = message.content.clone();
        if !self.orchestrator.session().model().supports_image_input() {
            return Ok(TurnContent::Text(text));
        }

        let mut image = None;
        for attachment in message.attachments.iter().filter(|a| a.is_image()) {
            let bytes = self.platform.fetch_attachment(attachment).await?;
            let media_type = attachment.content_type.as_deref().unwrap_or("image/png");
            image = Some(ImageRef::from_bytes(media_type, &bytes));
        }

        Ok(match image {
            Some(image) => TurnContent::TextWithImage { text, image },
            None => TurnContent::Text(text),
        })
    }
}

/// Posts a notice to the channel before each retry.
struct RetryNotifier<'a> {
    platform: &'a dyn ChatPlatform,
    message: &'a InboundMessage,
    limit: usize,
}

#[async_trait]
impl RetryObserver for RetryNotifier<'_> {
    async fn on_retry(&mut self, remaining: u32, error: &ProviderError) {
        let notice = format!("OpenAI API error occurred. Retrying (remaining {remaining}).\n{error}");
        if let Err(e) = self.platform.reply(self.message, &clamp(&notice, self.limit)).await {
            warn!(error = %e, "Failed to post retry notice");
        }
    }
}

/// Truncate to at most `limit` characters.
pub(crate) fn clamp(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
