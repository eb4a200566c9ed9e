//! One-shot websocket probe.
//!
//! LIFECYCLE
//! =========
//! 1. Connect to the endpoint (bounded by the connect timeout, if any)
//! 2. Send one `{"type":"frame","frame_id":...}` text frame
//! 3. Wait for exactly one data frame back (unbounded unless a reply
//!    timeout is configured)
//! 4. Close the connection, whatever happened in 2-3
//!
//! Nothing is retried. Control frames are not replies.

use std::time::Duration;

use frames::FrameRequest;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info};

use crate::error::ProbeError;

pub const DEFAULT_URL: &str = "ws://localhost:8000/ws";
pub const DEFAULT_FRAME_ID: &str = "test123";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on waiting for the peer to acknowledge our close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Everything a single probe run needs.
#[derive(Clone, Debug)]
pub struct ProbeConfig {
    /// Websocket endpoint, e.g. `ws://localhost:8000/ws`. Not validated here.
    pub url: String,
    /// Opaque identifier placed in the request's `frame_id`.
    pub frame_id: String,
    /// `None` waits for the opening handshake forever.
    pub connect_timeout: Option<Duration>,
    /// `None` waits for the reply forever.
    pub reply_timeout: Option<Duration>,
}

impl ProbeConfig {
    #[must_use]
    pub fn new(url: impl Into<String>, frame_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            frame_id: frame_id.into(),
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            reply_timeout: None,
        }
    }
}

/// Raw reply payload, never parsed.
///
/// Binary replies are stored as lossy UTF-8 so they print like text replies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
}

impl Reply {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Console line for the reply.
    #[must_use]
    pub fn line(&self) -> String {
        format!("Got: {}", self.text)
    }
}

/// Run one request/reply exchange against `config.url`.
///
/// The connection is closed before returning on every path that got past
/// the handshake.
///
/// # Errors
///
/// Returns [`ProbeError::Connect`] or [`ProbeError::ConnectTimeout`] when the
/// endpoint cannot be reached, and [`ProbeError::Transport`],
/// [`ProbeError::Closed`] or [`ProbeError::ReplyTimeout`] when the exchange
/// fails after connecting.
pub async fn run(config: &ProbeConfig) -> Result<Reply, ProbeError> {
    let mut stream = connect(config).await?;
    info!(url = %config.url, "probe connected");

    let result = exchange(&mut stream, config).await;
    close(&mut stream).await;

    match &result {
        Ok(reply) => info!(
            frame_id = %config.frame_id,
            bytes = reply.text.len(),
            "probe reply received"
        ),
        Err(error) => info!(
            frame_id = %config.frame_id,
            %error,
            "probe exchange failed"
        ),
    }
    result
}

async fn connect(config: &ProbeConfig) -> Result<WsStream, ProbeError> {
    let handshake = connect_async(config.url.as_str());
    let connected = match config.connect_timeout {
        Some(timeout) => tokio::time::timeout(timeout, handshake)
            .await
            .map_err(|_| ProbeError::ConnectTimeout {
                url: config.url.clone(),
                timeout,
            })?,
        None => handshake.await,
    };

    let (stream, _response) = connected.map_err(|error| ProbeError::Connect {
        url: config.url.clone(),
        source: Box::new(error),
    })?;
    Ok(stream)
}

async fn exchange(stream: &mut WsStream, config: &ProbeConfig) -> Result<Reply, ProbeError> {
    let payload = frames::encode_request(&FrameRequest::new(config.frame_id.as_str()))?;
    debug!(%payload, "sending frame request");
    stream.send(Message::text(payload)).await?;

    match config.reply_timeout {
        Some(timeout) => tokio::time::timeout(timeout, recv_reply(stream))
            .await
            .map_err(|_| ProbeError::ReplyTimeout(timeout))?,
        None => recv_reply(stream).await,
    }
}

async fn recv_reply(stream: &mut WsStream) -> Result<Reply, ProbeError> {
    loop {
        let Some(message) = stream.next().await else {
            return Err(ProbeError::Closed);
        };
        match message? {
            Message::Text(text) => return Ok(Reply::new(text.as_str())),
            Message::Binary(bytes) => return Ok(Reply::new(String::from_utf8_lossy(&bytes))),
            Message::Close(frame) => {
                debug!(?frame, "peer closed before replying");
                return Err(ProbeError::Closed);
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }
}

/// Send a close frame and wait (bounded) for the peer to finish the
/// handshake. Failures here are logged and never replace the exchange result.
async fn close(stream: &mut WsStream) {
    // After a peer-initiated close this fails with `SendAfterClosing`, but
    // tungstenite has already queued our close reply; the drain flushes it.
    if let Err(error) = stream.close(None).await {
        debug!(%error, "websocket close failed");
    }

    let drain = async {
        while let Some(message) = stream.next().await {
            if let Err(error) = message {
                debug!(%error, "websocket errored while closing");
                break;
            }
        }
    };
    if tokio::time::timeout(CLOSE_TIMEOUT, drain).await.is_err() {
        debug!(timeout = ?CLOSE_TIMEOUT, "peer did not acknowledge close");
    }
}

#[cfg(test)]
#[path = "probe_test.rs"]
mod tests;
