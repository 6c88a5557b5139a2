//! Unified error type for Parlor.

use parlor_game::WordListError;
use parlor_protocol::ProtocolError;
use parlor_room::RoomError;
use parlor_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, unknown kind).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, duplicate player, unavailable).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The configured word list had no usable words.
    #[error(transparent)]
    Words(#[from] WordListError),

    /// The request path names no room.
    #[error("no room in request path {0:?}")]
    NoRoom(String),
}
