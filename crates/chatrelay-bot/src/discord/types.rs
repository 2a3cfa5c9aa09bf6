//! Discord gateway and REST payload types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::platform::{Attachment, Author, CommandInvocation, InboundMessage, PlatformEvent};

// ---------------------------------------------------------------------------
// Gateway opcodes and intents
// ---------------------------------------------------------------------------

pub const OP_DISPATCH: u8 = 0;
pub const OP_HEARTBEAT: u8 = 1;
pub const OP_IDENTIFY: u8 = 2;
pub const OP_RECONNECT: u8 = 7;
pub const OP_INVALID_SESSION: u8 = 9;
pub const OP_HELLO: u8 = 10;
pub const OP_HEARTBEAT_ACK: u8 = 11;

pub const INTENT_GUILDS: u64 = 1 << 0;
pub const INTENT_GUILD_MESSAGES: u64 = 1 << 9;
pub const INTENT_MESSAGE_CONTENT: u64 = 1 << 15;

/// Intents the bot identifies with.
pub const DEFAULT_INTENTS: u64 = INTENT_GUILDS | INTENT_GUILD_MESSAGES | INTENT_MESSAGE_CONTENT;

/// Interaction type for slash commands.
pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;
/// Interaction callback type that answers with a message.
pub const CALLBACK_CHANNEL_MESSAGE: u8 = 4;

/// Close codes after which reconnecting cannot help.
pub const FATAL_CLOSE_CODES: [u16; 6] = [4004, 4010, 4011, 4012, 4013, 4014];

// ---------------------------------------------------------------------------
// Gateway frames
// ---------------------------------------------------------------------------

/// A gateway frame in either direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayPayload {
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self {
            op: OP_HEARTBEAT,
            d: serde_json::json!(last_sequence),
            s: None,
            t: None,
        }
    }

    pub fn identify(token: &str, intents: u64) -> Self {
        Self {
            op: OP_IDENTIFY,
            d: serde_json::json!({
                "token": token,
                "intents": intents,
                "properties": {
                    "os": std::env::consts::OS,
                    "browser": "chatrelay",
                    "device": "chatrelay",
                },
            }),
            s: None,
            t: None,
        }
    }

    /// `heartbeat_interval` from a HELLO frame, in milliseconds.
    pub fn heartbeat_interval_ms(&self) -> Option<u64> {
        if self.op != OP_HELLO {
            return None;
        }
        self.d.get("heartbeat_interval")?.as_u64()
    }
}

// ---------------------------------------------------------------------------
// Dispatch bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct IdOnly {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadyEvent {
    pub user: IdOnly,
    pub application: IdOnly,
}

#[derive(Debug, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Deserialize)]
pub struct DiscordAttachment {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DiscordMessage {
    pub id: String,
    pub channel_id: String,
    pub author: DiscordUser,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<DiscordAttachment>,
}

impl From<DiscordMessage> for InboundMessage {
    fn from(m: DiscordMessage) -> Self {
        Self {
            id: m.id,
            channel_id: m.channel_id,
            author: Author {
                id: m.author.id,
                bot: m.author.bot,
            },
            content: m.content,
            attachments: m
                .attachments
                .into_iter()
                .map(|a| Attachment {
                    url: a.url,
                    filename: a.filename,
                    content_type: a.content_type,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InteractionOption {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct InteractionData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<InteractionOption>,
}

#[derive(Debug, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub token: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<InteractionData>,
}

impl Interaction {
    /// Slash-command invocations only; other interaction kinds yield `None`.
    pub fn into_command(self) -> Option<CommandInvocation> {
        if self.kind != INTERACTION_APPLICATION_COMMAND {
            return None;
        }
        let data = self.data?;
        let options: HashMap<String, String> = data
            .options
            .into_iter()
            .map(|o| {
                let value = match o.value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (o.name, value)
            })
            .collect();
        Some(CommandInvocation {
            id: self.id,
            token: self.token,
            name: data.name,
            options,
        })
    }
}

/// Translate a dispatch (`op` 0) into a platform event.
///
/// Unhandled event names and undecodable bodies yield `None`.
pub fn decode_dispatch(event: &str, d: serde_json::Value) -> Option<PlatformEvent> {
    match event {
        "READY" => {
            let ready: ReadyEvent = serde_json::from_value(d).ok()?;
            Some(PlatformEvent::Ready {
                user_id: ready.user.id,
                application_id: ready.application.id,
            })
        }
        "MESSAGE_CREATE" => {
            let message: DiscordMessage = serde_json::from_value(d).ok()?;
            Some(PlatformEvent::Message(message.into()))
        }
        "INTERACTION_CREATE" => {
            let interaction: Interaction = serde_json::from_value(d).ok()?;
            interaction.into_command().map(PlatformEvent::Command)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// REST bodies
// ---------------------------------------------------------------------------

/// Response body of a message create call. Other fields are ignored.
#[derive(Debug, Deserialize)]
pub struct CreatedMessage {
    pub id: String,
    pub channel_id: String,
}

/// Body of a `429` response. Other fields are ignored.
#[derive(Debug, Deserialize)]
pub struct RateLimitBody {
    /// Seconds to wait before retrying.
    pub retry_after: f64,
}
