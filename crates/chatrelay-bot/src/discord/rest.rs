//! Discord REST v10 client implementing [`ChatPlatform`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chatrelay_common::PlatformError;
use tracing::{debug, info, warn};

use crate::platform::{Attachment, ChatPlatform, CommandInvocation, InboundMessage, SentMessage};

use super::commands::command_definitions;
use super::types::{CreatedMessage, RateLimitBody, CALLBACK_CHANNEL_MESSAGE};

/// Rate-limited requests are retried this many times before giving up.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;
/// Upper bound on a single rate-limit wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

pub struct DiscordRest {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl fmt::Debug for DiscordRest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordRest")
            .field("api_base", &self.api_base)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl DiscordRest {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("DiscordBot (chatrelay, ", env!("CARGO_PKG_VERSION"), ")"))
            .build()
            .map_err(|e| PlatformError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.token)
    }

    async fn create_message(
        &self,
        channel_id: &str,
        body: serde_json::Value,
    ) -> Result<SentMessage, PlatformError> {
        let url = self.url(&format!("/channels/{channel_id}/messages"));
        let response = self.execute(|| self.http.post(&url).json(&body)).await?;
        let created: CreatedMessage = response
            .json()
            .await
            .map_err(|e| PlatformError::Decode(e.to_string()))?;
        Ok(SentMessage {
            id: created.id,
            channel_id: created.channel_id,
        })
    }

    /// Send an authorized request, waiting out `429` responses.
    ///
    /// Non-success statuses, including a rate limit that outlasts the
    /// retries, become [`PlatformError::Delivery`].
    async fn execute(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, PlatformError> {
        let mut retries = 0;
        loop {
            let response = build()
                .header(reqwest::header::AUTHORIZATION, self.auth())
                .send()
                .await
                .map_err(|e| PlatformError::Delivery(e.to_string()))?;

            if response.status() != reqwest::StatusCode::TOO_MANY_REQUESTS
                || retries >= MAX_RATE_LIMIT_RETRIES
            {
                return check_status(response).await;
            }

            retries += 1;
            let wait = retry_after(response).await;
            warn!(
                wait_ms = wait.as_millis() as u64,
                retry = retries,
                "Discord rate limit hit"
            );
            tokio::time::sleep(wait).await;
        }
    }
}

/// Wait requested by a `429`: the body's `retry_after`, else the
/// `Retry-After` header, else one second.
async fn retry_after(response: reqwest::Response) -> Duration {
    let header_secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok());
    let body_secs = response
        .json::<RateLimitBody>()
        .await
        .ok()
        .map(|body| body.retry_after);
    wait_from_secs(body_secs.or(header_secs))
}

fn wait_from_secs(secs: Option<f64>) -> Duration {
    secs.filter(|s| s.is_finite() && *s >= 0.0)
        .map(|s| Duration::from_secs_f64(s.min(MAX_RETRY_AFTER.as_secs_f64())))
        .unwrap_or(Duration::from_secs(1))
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let text = text.chars().take(200).collect::<String>();
    Err(PlatformError::Delivery(format!("HTTP {status}: {text}")))
}

#[async_trait]
impl ChatPlatform for DiscordRest {
    async fn reply(&self, to: &InboundMessage, content: &str) -> Result<SentMessage, PlatformError> {
        debug!(channel_id = %to.channel_id, message_id = %to.id, "reply");
        let body = serde_json::json!({
            "content": content,
            "message_reference": {
                "message_id": to.id,
                "fail_if_not_exists": false,
            },
            "allowed_mentions": {
                "parse": ["users", "roles", "everyone"],
                "replied_user": false,
            },
        });
        self.create_message(&to.channel_id, body).await
    }

    async fn send(&self, channel_id: &str, content: &str) -> Result<SentMessage, PlatformError> {
        debug!(channel_id, "send");
        self.create_message(channel_id, serde_json::json!({ "content": content }))
            .await
    }

    async fn delete(&self, message: &SentMessage) -> Result<(), PlatformError> {
        let url = self.url(&format!(
            "/channels/{}/messages/{}",
            message.channel_id, message.id
        ));
        self.execute(|| self.http.delete(&url)).await?;
        Ok(())
    }

    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, PlatformError> {
        debug!(filename = %attachment.filename, "fetching attachment");
        let response = self
            .http
            .get(&attachment.url)
            .send()
            .await
            .map_err(|e| PlatformError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::Http(format!(
                "HTTP {status} fetching {}",
                attachment.filename
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PlatformError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn respond_to_command(
        &self,
        invocation: &CommandInvocation,
        content: &str,
    ) -> Result<(), PlatformError> {
        let url = self.url(&format!(
            "/interactions/{}/{}/callback",
            invocation.id, invocation.token
        ));
        let body = serde_json::json!({
            "type": CALLBACK_CHANNEL_MESSAGE,
            "data": { "content": content },
        });
        self.execute(|| self.http.post(&url).json(&body)).await?;
        Ok(())
    }

    /// Overwrite the bot's global slash commands.
    async fn register_commands(&self, application_id: &str) -> Result<(), PlatformError> {
        let url = self.url(&format!("/applications/{application_id}/commands"));
        let definitions = command_definitions();
        self.execute(|| self.http.put(&url).json(&definitions)).await?;
        info!(application_id, "Slash commands registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::platform::Author;

    fn inbound() -> InboundMessage {
        InboundMessage {
            id: "555".into(),
            channel_id: "9".into(),
            author: Author {
                id: "5".into(),
                bot: false,
            },
            content: "hi".into(),
            attachments: Vec::new(),
        }
    }

    async fn rest(server: &MockServer) -> DiscordRest {
        DiscordRest::new(server.uri(), "tok").unwrap()
    }

    #[tokio::test]
    async fn reply_references_message_without_ping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/9/messages"))
            .and(header("authorization", "Bot tok"))
            .and(body_partial_json(json!({
                "content": "Generating...",
                "message_reference": {"message_id": "555"},
                "allowed_mentions": {"replied_user": false}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "600", "channel_id": "9"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sent = rest(&server).await.reply(&inbound(), "Generating...").await.unwrap();
        assert_eq!(
            sent,
            SentMessage {
                id: "600".into(),
                channel_id: "9".into()
            }
        );
    }

    #[tokio::test]
    async fn send_posts_plain_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/9/messages"))
            .and(body_partial_json(json!({"content": "No question content."})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "601", "channel_id": "9"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sent = rest(&server).await.send("9", "No question content.").await.unwrap();
        assert_eq!(sent.id, "601");
    }

    #[tokio::test]
    async fn delete_hits_message_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/channels/9/messages/600"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let message = SentMessage {
            id: "600".into(),
            channel_id: "9".into(),
        };
        rest(&server).await.delete(&message).await.unwrap();
    }

    #[tokio::test]
    async fn error_status_is_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/9/messages"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Missing Permissions"))
            .mount(&server)
            .await;

        let err = rest(&server).await.send("9", "x").await.unwrap_err();
        assert!(err.is_delivery());
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn rate_limited_send_waits_and_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "message": "You are being rate limited.",
                "retry_after": 0.01,
                "global": false
            })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/channels/1/messages"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "700", "channel_id": "1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sent = rest(&server).await.send("1", "chunk").await.unwrap();
        assert_eq!(sent.id, "700");
    }

    #[tokio::test]
    async fn persistent_rate_limit_gives_up() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/channels/1/messages/2"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "0")
                    .set_body_string("slow down"),
            )
            .expect(u64::from(MAX_RATE_LIMIT_RETRIES) + 1)
            .mount(&server)
            .await;

        let message = SentMessage {
            id: "2".into(),
            channel_id: "1".into(),
        };
        let err = rest(&server).await.delete(&message).await.unwrap_err();
        assert!(err.is_delivery());
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn retry_wait_is_bounded() {
        assert_eq!(wait_from_secs(Some(0.25)), Duration::from_millis(250));
        assert_eq!(wait_from_secs(None), Duration::from_secs(1));
        assert_eq!(wait_from_secs(Some(-1.0)), Duration::from_secs(1));
        assert_eq!(wait_from_secs(Some(3600.0)), MAX_RETRY_AFTER);
        assert_eq!(wait_from_secs(Some(1e30)), MAX_RETRY_AFTER);
    }

    #[tokio::test]
    async fn fetch_attachment_returns_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/attachments/cat.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let attachment = Attachment {
            url: format!("{}/attachments/cat.png", server.uri()),
            filename: "cat.png".into(),
            content_type: Some("image/png".into()),
        };
        let bytes = rest(&server).await.fetch_attachment(&attachment).await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn command_response_uses_callback_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/interactions/300/itok/callback"))
            .and(body_partial_json(json!({
                "type": 4,
                "data": {"content": "Chat history cleared."}
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let invocation = CommandInvocation {
            id: "300".into(),
            token: "itok".into(),
            name: "gpt-hflush".into(),
            options: HashMap::new(),
        };
        rest(&server)
            .await
            .respond_to_command(&invocation, "Chat history cleared.")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn register_commands_puts_definitions() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/applications/200/commands"))
            .and(header("authorization", "Bot tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let rest = rest(&server).await;
        rest.register_commands("200").await.unwrap();
    }

    #[test]
    fn debug_redacts_token() {
        let rest = DiscordRest::new("https://discord.com/api/v10/", "secret-token").unwrap();
        let debug = format!("{rest:?}");
        assert!(!debug.contains("secret-token"));
        assert_eq!(rest.url("/x"), "https://discord.com/api/v10/x");
    }
}
