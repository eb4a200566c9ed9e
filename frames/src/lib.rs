//! Request envelope and JSON codec for the frame probe.
//!
//! This crate owns the wire representation shared by the probe binary and
//! any test servers that acknowledge it. A request travels as a single
//! WebSocket text frame carrying `{"type":"frame","frame_id":"..."}`.

use serde::{Deserialize, Serialize};

/// Literal carried in the `type` field of every request.
pub const FRAME_TYPE: &str = "frame";

/// Error returned by [`encode_request`] and [`decode_request`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload is not valid JSON or does not have the envelope shape.
    #[error("invalid request json: {0}")]
    Json(#[from] serde_json::Error),
    /// The envelope's `type` field is something other than [`FRAME_TYPE`].
    #[error("unexpected request type: {0}")]
    UnexpectedType(String),
}

/// A single probe request.
///
/// The `type` field is implied; only the caller-supplied identifier varies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRequest {
    /// Opaque identifier chosen by the caller. Not validated.
    pub frame_id: String,
}

impl FrameRequest {
    #[must_use]
    pub fn new(frame_id: impl Into<String>) -> Self {
        Self {
            frame_id: frame_id.into(),
        }
    }
}

/// Encode a request into compact JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails. With string-only
/// fields this does not happen in practice.
pub fn encode_request(request: &FrameRequest) -> Result<String, CodecError> {
    let wire = request_to_wire(request);
    Ok(serde_json::to_string(&wire)?)
}

/// Decode JSON text into a request.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed text, missing or extra keys,
/// and [`CodecError::UnexpectedType`] when `type` is not `"frame"`.
pub fn decode_request(text: &str) -> Result<FrameRequest, CodecError> {
    let wire: WireRequest = serde_json::from_str(text)?;
    wire_to_request(wire)
}

fn request_to_wire(request: &FrameRequest) -> WireRequestRef<'_> {
    WireRequestRef {
        kind: FRAME_TYPE,
        frame_id: &request.frame_id,
    }
}

fn wire_to_request(wire: WireRequest) -> Result<FrameRequest, CodecError> {
    if wire.kind != FRAME_TYPE {
        return Err(CodecError::UnexpectedType(wire.kind));
    }
    Ok(FrameRequest {
        frame_id: wire.frame_id,
    })
}

// Field order here is the key order on the wire.
#[derive(Serialize)]
struct WireRequestRef<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    frame_id: &'a str,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WireRequest {
    #[serde(rename = "type")]
    kind: String,
    frame_id: String,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
