//! Room state data model.
//!
//! These are the values that get replicated to every client in a room.
//! The JSON field names match what the browser client renders
//! (`users`, `started`, `word`, `logs`, `isAdmin`, `isImposter`).

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// Opaque identifier of a player's connection.
///
/// Unique within a room and stable for the lifetime of the connection.
/// Serialized as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Creates a player ID from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One participant in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,

    /// Name chosen by the player. Absent until they send one.
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// The player allowed to start rounds. Exactly one per non-empty room.
    pub is_admin: bool,

    /// The imposter for the current round: the one player who is not
    /// meant to see the secret word.
    #[serde(rename = "isImposter")]
    pub is_special_role: bool,
}

impl Player {
    /// A freshly joined player with no name and no role.
    pub fn joined(id: PlayerId, is_admin: bool) -> Self {
        Self {
            id,
            display_name: None,
            is_admin,
            is_special_role: false,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The full replicated state of one room.
///
/// Invariants held by every state reachable through
/// [`apply`](crate::apply), given the coordinator never adds a duplicate id:
///
/// - no two players share an `id`
/// - a non-empty room has exactly one admin
/// - while `round_active`, exactly one player has the special role and
///   `secret_value` is non-empty
/// - `event_log` only grows, one entry per applied action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomState {
    /// Players in join order.
    #[serde(rename = "users")]
    pub players: Vec<Player>,

    #[serde(rename = "started")]
    pub round_active: bool,

    #[serde(rename = "word")]
    pub secret_value: String,

    #[serde(rename = "logs")]
    pub event_log: Vec<String>,
}

impl RoomState {
    /// An empty room with no round in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a player by ID.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Returns `true` if a player with this ID is in the room.
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.player(id).is_some()
    }

    /// The player currently holding the special role, if a round is active.
    pub fn special_role(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_special_role)
    }
}
