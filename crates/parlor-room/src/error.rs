//! Error types for the room layer.

use parlor_game::PlayerId;
use parlor_protocol::RoomId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// A connection with this player ID is already open in the room, or
    /// the room already has a player by that ID.
    #[error("player {0} already in room {1}")]
    DuplicatePlayer(PlayerId, RoomId),

    /// The player has no open connection in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
