//! Gateway WebSocket connection loop with auto-reconnect.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use crate::platform::PlatformEvent;

use super::types::{
    decode_dispatch, GatewayPayload, DEFAULT_INTENTS, FATAL_CLOSE_CODES, OP_DISPATCH,
    OP_HEARTBEAT, OP_HEARTBEAT_ACK, OP_INVALID_SESSION, OP_RECONNECT,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub token: String,
    pub intents: u64,
    pub reconnect_delay_secs: u64,
    pub max_reconnect_delay_secs: u64,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .field("intents", &self.intents)
            .finish()
    }
}

impl GatewayConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            intents: DEFAULT_INTENTS,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 60,
        }
    }
}

/// How a single gateway session ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Reconnect,
    Fatal(String),
}

// ---------------------------------------------------------------------------
// Connection Loop
// ---------------------------------------------------------------------------

/// Keep a gateway session alive, forwarding decoded events to `event_tx`.
///
/// Returns when the receiver is dropped or Discord rejects the session
/// in a way reconnecting cannot fix.
pub async fn connection_loop(config: GatewayConfig, event_tx: mpsc::Sender<PlatformEvent>) {
    let mut reconnect_delay = config.reconnect_delay_secs;

    loop {
        info!(url = %config.url.split('?').next().unwrap_or(""), "Connecting to Discord gateway");

        match tokio::time::timeout(CONNECT_TIMEOUT, tokio_tungstenite::connect_async(&config.url))
            .await
        {
            Ok(Ok((ws_stream, _))) => {
                reconnect_delay = config.reconnect_delay_secs;
                match run_session(&config, ws_stream, &event_tx).await {
                    SessionEnd::Reconnect => {}
                    SessionEnd::Fatal(reason) => {
                        error!(reason = %reason, "Gateway session cannot be resumed");
                        return;
                    }
                }
                if event_tx.is_closed() {
                    return;
                }
            }
            Ok(Err(e)) => {
                error!(error = %e, "Failed to connect to Discord gateway");
            }
            Err(_elapsed) => {
                error!("Gateway connection timed out after 15s");
            }
        }

        info!(
            delay = reconnect_delay,
            "Reconnecting in {} seconds", reconnect_delay
        );
        tokio::time::sleep(Duration::from_secs(reconnect_delay)).await;
        reconnect_delay = (reconnect_delay * 2).min(config.max_reconnect_delay_secs);
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn run_session(
    config: &GatewayConfig,
    ws_stream: WsStream,
    event_tx: &mpsc::Sender<PlatformEvent>,
) -> SessionEnd {
    let (ws_write, mut ws_read) = ws_stream.split();
    let ws_write = Arc::new(Mutex::new(ws_write));
    // 0 means no dispatch seen yet; Discord sequences start at 1.
    let last_sequence = Arc::new(AtomicU64::new(0));
    let mut heartbeat_handle = None;

    let end = loop {
        let Some(frame) = ws_read.next().await else {
            info!("Gateway stream ended");
            break SessionEnd::Reconnect;
        };
        let text = match frame {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Close(close)) => {
                let code = close.as_ref().map(|c| u16::from(c.code));
                info!(code = ?code, "Gateway closed connection");
                break match code {
                    Some(code) if FATAL_CLOSE_CODES.contains(&code) => {
                        SessionEnd::Fatal(format!("close code {code}"))
                    }
                    _ => SessionEnd::Reconnect,
                };
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "WebSocket error");
                break SessionEnd::Reconnect;
            }
        };

        let payload: GatewayPayload = match serde_json::from_str(&text) {
            Ok(p) => p,
            Err(_) => {
                debug!(text = %text, "Unrecognized gateway frame");
                continue;
            }
        };

        if let Some(interval_ms) = payload.heartbeat_interval_ms() {
            debug!(interval_ms, "Gateway HELLO");
            heartbeat_handle = Some(tokio::spawn(heartbeat_task(
                Arc::clone(&ws_write),
                Arc::clone(&last_sequence),
                Duration::from_millis(interval_ms),
            )));
            let identify = GatewayPayload::identify(&config.token, config.intents);
            if let Err(e) = send_payload(&ws_write, &identify).await {
                warn!(error = %e, "Failed to send IDENTIFY");
                break SessionEnd::Reconnect;
            }
            continue;
        }

        match payload.op {
            OP_DISPATCH => {
                if let Some(seq) = payload.s {
                    last_sequence.store(seq, Ordering::Relaxed);
                }
                let Some(name) = payload.t.as_deref() else {
                    continue;
                };
                if let Some(event) = decode_dispatch(name, payload.d) {
                    if event_tx.send(event).await.is_err() {
                        break SessionEnd::Reconnect;
                    }
                }
            }
            OP_HEARTBEAT => {
                let beat = GatewayPayload::heartbeat(sequence(&last_sequence));
                if let Err(e) = send_payload(&ws_write, &beat).await {
                    warn!(error = %e, "Failed to answer heartbeat request");
                    break SessionEnd::Reconnect;
                }
            }
            OP_HEARTBEAT_ACK => debug!("Heartbeat acknowledged"),
            OP_RECONNECT => {
                info!("Gateway requested reconnect");
                break SessionEnd::Reconnect;
            }
            OP_INVALID_SESSION => {
                warn!("Gateway session invalidated");
                tokio::time::sleep(Duration::from_secs(2)).await;
                break SessionEnd::Reconnect;
            }
            op => debug!(op, "Unhandled gateway opcode"),
        }
    };

    if let Some(handle) = heartbeat_handle {
        handle.abort();
    }
    end
}

fn sequence(last_sequence: &AtomicU64) -> Option<u64> {
    match last_sequence.load(Ordering::Relaxed) {
        0 => None,
        seq => Some(seq),
    }
}

async fn send_payload<W>(ws_write: &Mutex<W>, payload: &GatewayPayload) -> Result<(), String>
where
    W: futures_util::Sink<WsMessage> + Unpin,
    W::Error: std::fmt::Display,
{
    let json = serde_json::to_string(payload).map_err(|e| e.to_string())?;
    let mut writer = ws_write.lock().await;
    writer
        .send(WsMessage::Text(json.into()))
        .await
        .map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Heartbeat
// ---------------------------------------------------------------------------

async fn heartbeat_task<W>(ws_write: Arc<Mutex<W>>, last_sequence: Arc<AtomicU64>, period: Duration)
where
    W: futures_util::Sink<WsMessage> + Unpin,
    W::Error: std::fmt::Display,
{
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    loop {
        interval.tick().await;
        let beat = GatewayPayload::heartbeat(sequence(&last_sequence));
        if let Err(e) = send_payload(&ws_write, &beat).await {
            warn!(error = %e, "Heartbeat failed");
            break;
        }
    }
}
