/// Boxed cause from the underlying protocol library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not bind its address.
    #[error("bind {addr} failed: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// The peer did not complete the opening handshake.
    #[error("handshake failed: {0}")]
    Handshake(#[source] BoxError),

    /// The peer took longer than the handshake deadline.
    #[error("handshake timed out")]
    HandshakeTimeout,

    /// The peer is gone; nothing more can be sent.
    #[error("connection closed")]
    Closed,

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    Send(#[source] BoxError),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    Receive(#[source] BoxError),
}
