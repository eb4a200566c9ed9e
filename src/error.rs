use std::time::Duration;

/// Failures surfaced by a probe run. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("websocket connect to {url} failed: {source}")]
    Connect {
        url: String,
        source: Box<tokio_tungstenite::tungstenite::Error>,
    },
    #[error("websocket connect to {url} timed out after {timeout:?}")]
    ConnectTimeout { url: String, timeout: Duration },
    #[error("request encode failed: {0}")]
    Encode(#[from] frames::CodecError),
    #[error("websocket transport failed: {0}")]
    Transport(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed before a reply arrived")]
    Closed,
    #[error("timed out after {0:?} waiting for reply")]
    ReplyTimeout(Duration),
}

impl From<tokio_tungstenite::tungstenite::Error> for ProbeError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Transport(Box::new(error))
    }
}
