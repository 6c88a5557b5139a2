//! Message types that travel on the wire.
//!
//! Inbound frames look like `{ "type": "UPDATE_NAME", "payload": {...} }`.
//! Decoding happens in two steps: first into the loosely typed
//! [`Inbound`] envelope, then into the closed [`ClientMessage`] sum type.
//! Splitting it this way lets the coordinator tell an unknown `type`
//! apart from a known `type` with a malformed payload.
//!
//! Outbound frames are [`ServerMessage`]s: either a full state snapshot
//! tagged with the action that produced it, or a query answer tagged
//! with the query kind.

use std::fmt;

use parlor_game::{
    Action, ActionKind, PlayerId, Query, QueryAnswer, QueryKind, RoomState,
};
use serde::{Deserialize, Serialize};

use crate::{Codec, ProtocolError};

// ---------------------------------------------------------------------------
// RoomId
// ---------------------------------------------------------------------------

/// Identifier of a room, taken from the connection URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extracts the room from a request path: the last non-empty segment.
    ///
    /// `/parties/main/ABC123` and `/ABC123/` both give `ABC123`; `/` gives
    /// `None`.
    pub fn from_path(path: &str) -> Option<Self> {
        path.split('/')
            .rev()
            .find(|segment| !segment.is_empty())
            .map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// The raw inbound envelope: a string tag plus an untyped payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inbound {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Inbound {
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// A payload naming one player. Clients send either the bare id string
/// (`REMOVE_USER`) or an object with an `id` field (everything else);
/// both are accepted everywhere.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlayerRef {
    Bare(PlayerId),
    Object { id: PlayerId },
}

impl From<PlayerRef> for PlayerId {
    fn from(r: PlayerRef) -> Self {
        match r {
            PlayerRef::Bare(id) | PlayerRef::Object { id } => id,
        }
    }
}

#[derive(Deserialize)]
struct RenamePayload {
    id: PlayerId,
    name: String,
}

// ---------------------------------------------------------------------------
// ClientMessage
// ---------------------------------------------------------------------------

/// A decoded inbound message: a mutation or a read-only query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Action(Action),
    Query(Query),
}

impl ClientMessage {
    /// Decodes raw bytes with the given codec.
    ///
    /// # Errors
    /// - `ProtocolError::Decode` if the bytes aren't an envelope or the
    ///   payload doesn't fit the `type`
    /// - `ProtocolError::UnknownKind` if the `type` is not recognized
    pub fn decode(
        codec: &impl Codec,
        data: &[u8],
    ) -> Result<Self, ProtocolError> {
        let inbound: Inbound = codec.decode(data)?;
        Self::try_from(inbound)
    }

    /// The wire tag of this message.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Action(action) => action.kind().as_str(),
            Self::Query(query) => query.kind().as_str(),
        }
    }
}

impl TryFrom<Inbound> for ClientMessage {
    type Error = ProtocolError;

    fn try_from(inbound: Inbound) -> Result<Self, Self::Error> {
        let Inbound { kind, payload } = inbound;

        if let Some(action_kind) = ActionKind::from_tag(&kind) {
            let action = match action_kind {
                ActionKind::AddUser => {
                    Action::AddPlayer(payload_as::<PlayerRef>(payload)?.into())
                }
                ActionKind::RemoveUser => Action::RemovePlayer(
                    payload_as::<PlayerRef>(payload)?.into(),
                ),
                ActionKind::LogMessage => {
                    Action::AppendLog(payload_as::<String>(payload)?)
                }
                ActionKind::UpdateName => {
                    let RenamePayload { id, name } = payload_as(payload)?;
                    Action::RenamePlayer { id, name }
                }
                ActionKind::NewRound => Action::StartRound {
                    requesting: payload_as::<PlayerRef>(payload)?.into(),
                },
            };
            return Ok(Self::Action(action));
        }

        match QueryKind::from_tag(&kind) {
            Some(QueryKind::GetAdmin) => Ok(Self::Query(Query::GetAdmin {
                requesting: payload_as::<PlayerRef>(payload)?.into(),
            })),
            None => Err(ProtocolError::UnknownKind(kind)),
        }
    }
}

fn payload_as<T: serde::de::DeserializeOwned>(
    payload: serde_json::Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(payload).map_err(ProtocolError::Decode)
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// An outbound message, sent to every connection in a room (or, for query
/// replies in requester mode, to one connection).
///
/// Serializes untagged:
/// - `{ "gameState": {...}, "action": "ADD_USER" }`
/// - `{ "value": {...} | null, "action": "GET_ADMIN" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    /// The full room state after an action was applied.
    State {
        #[serde(rename = "gameState")]
        game_state: RoomState,
        action: ActionKind,
    },

    /// The answer to a query.
    Reply {
        value: QueryAnswer,
        action: QueryKind,
    },
}

impl ServerMessage {
    pub fn state(game_state: RoomState, action: ActionKind) -> Self {
        Self::State { game_state, action }
    }

    pub fn reply(value: QueryAnswer, action: QueryKind) -> Self {
        Self::Reply { value, action }
    }

    /// The tag carried in the `action` field.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::State { action, .. } => action.as_str(),
            Self::Reply { action, .. } => action.as_str(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
