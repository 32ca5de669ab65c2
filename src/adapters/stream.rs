//! Log Stream Adapter
//!
//! WebSocket subscription to AMM program logs via the RPC `logsSubscribe`
//! method at `processed` commitment. Raw notification frames are forwarded
//! verbatim to the orchestrator over a channel; the stream never parses
//! past the transport layer.
//!
//! A dropped connection is rebuilt after a fixed delay. On the very first
//! connect a `logsUnsubscribe` is sent first, clearing any subscription
//! left over from a previous session on the same endpoint.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("WebSocket connection failed: {0}")]
    ConnectionFailed(String),
    #[error("WebSocket error: {0}")]
    WebSocketError(String),
    #[error("Frame channel closed")]
    ChannelClosed,
}

#[derive(Debug, Clone)]
pub struct LogStreamConfig {
    pub ws_url: String,
    /// AMM program id passed as the `mentions` filter
    pub program_id: String,
    pub reconnect_delay: Duration,
}

pub struct LogStream {
    config: LogStreamConfig,
}

impl LogStream {
    pub fn new(config: LogStreamConfig) -> Self {
        Self { config }
    }

    /// Run the subscription loop until the receiving side hangs up.
    /// Connection failures reconnect after the configured fixed delay.
    pub async fn run(&self, frames: mpsc::Sender<String>) -> Result<(), StreamError> {
        let mut first_connect = true;
        loop {
            match self.run_connection(&frames, first_connect).await {
                Ok(()) => {
                    warn!("WebSocket closed. Reconnecting...");
                }
                Err(StreamError::ChannelClosed) => {
                    info!("Frame channel closed. Stream stopping.");
                    return Ok(());
                }
                Err(e) => {
                    error!("WebSocket error: {}. Reconnecting...", e);
                }
            }
            first_connect = false;
            tokio::time::sleep(self.config.reconnect_delay).await;
        }
    }

    /// One connection lifetime: subscribe, then pump frames into the
    /// channel until the socket closes.
    async fn run_connection(
        &self,
        frames: &mpsc::Sender<String>,
        first_connect: bool,
    ) -> Result<(), StreamError> {
        let (ws, _) = connect_async(self.config.ws_url.as_str())
            .await
            .map_err(|e| StreamError::ConnectionFailed(e.to_string()))?;
        let (mut write, mut read) = ws.split();
        info!("WebSocket is open and listening.");

        if first_connect {
            let unsubscribe = json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "logsUnsubscribe",
                "params": [],
            });
            write
                .send(Message::Text(unsubscribe.to_string().into()))
                .await
                .map_err(|e| StreamError::WebSocketError(e.to_string()))?;
        }

        let subscribe = subscribe_request(&self.config.program_id);
        write
            .send(Message::Text(subscribe.to_string().into()))
            .await
            .map_err(|e| StreamError::WebSocketError(e.to_string()))?;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    if frames.send(text.to_string()).await.is_err() {
                        return Err(StreamError::ChannelClosed);
                    }
                }
                Ok(Message::Ping(payload)) => {
                    write
                        .send(Message::Pong(payload))
                        .await
                        .map_err(|e| StreamError::WebSocketError(e.to_string()))?;
                }
                Ok(Message::Close(_)) => return Ok(()),
                Ok(other) => debug!("Ignoring non-text frame: {:?}", other),
                Err(e) => return Err(StreamError::WebSocketError(e.to_string())),
            }
        }
        Ok(())
    }
}

/// `logsSubscribe` request filtered to transactions mentioning the AMM
/// program, at `processed` commitment for earliest delivery.
fn subscribe_request(program_id: &str) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "logsSubscribe",
        "params": [
            { "mentions": [program_id] },
            { "commitment": "processed" },
        ],
    })
}
