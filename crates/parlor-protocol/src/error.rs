//! Error types for the protocol layer.

/// Errors that can occur turning wire bytes into messages and back.
///
/// None of these are fatal: the coordinator drops a message that fails
/// to decode and carries on.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The bytes were not valid JSON, or the payload didn't have the
    /// shape its `type` requires.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The `type` tag names no known action or query.
    #[error("unknown message type: {0}")]
    UnknownKind(String),
}
