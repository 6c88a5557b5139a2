//! Actions (state mutations) and queries (read-only requests).
//!
//! Both are closed sum types: the wire layer maps its string tags onto
//! these variants once, and everything past that point matches
//! exhaustively.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Player, PlayerId, RoomState};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A request to mutate a room's state. The only mutation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddPlayer(PlayerId),
    RemovePlayer(PlayerId),
    AppendLog(String),
    RenamePlayer { id: PlayerId, name: String },
    StartRound { requesting: PlayerId },
}

impl Action {
    /// The wire tag for this action.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::AddPlayer(_) => ActionKind::AddUser,
            Self::RemovePlayer(_) => ActionKind::RemoveUser,
            Self::AppendLog(_) => ActionKind::LogMessage,
            Self::RenamePlayer { .. } => ActionKind::UpdateName,
            Self::StartRound { .. } => ActionKind::NewRound,
        }
    }
}

/// Tag identifying which action produced a broadcast.
///
/// Serialized in SCREAMING_SNAKE_CASE (`"ADD_USER"`, `"NEW_ROUND"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    AddUser,
    RemoveUser,
    LogMessage,
    UpdateName,
    NewRound,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        Self::AddUser,
        Self::RemoveUser,
        Self::LogMessage,
        Self::UpdateName,
        Self::NewRound,
    ];

    /// The wire tag as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddUser => "ADD_USER",
            Self::RemoveUser => "REMOVE_USER",
            Self::LogMessage => "LOG_MESSAGE",
            Self::UpdateName => "UPDATE_NAME",
            Self::NewRound => "NEW_ROUND",
        }
    }

    /// Parses a wire tag. Returns `None` for anything that isn't a
    /// mutating action.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A read-only request answered from the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Who is the admin? `requesting` is carried on the wire but does not
    /// affect the answer.
    GetAdmin { requesting: PlayerId },
}

impl Query {
    pub fn kind(&self) -> QueryKind {
        match self {
            Self::GetAdmin { .. } => QueryKind::GetAdmin,
        }
    }

    /// Computes the answer without touching the state.
    pub fn answer(&self, state: &RoomState) -> QueryAnswer {
        match self {
            Self::GetAdmin { .. } => {
                QueryAnswer::Admin(crate::find_admin(state).cloned())
            }
        }
    }
}

/// Tag identifying which query a reply answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryKind {
    GetAdmin,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetAdmin => "GET_ADMIN",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "GET_ADMIN" => Some(Self::GetAdmin),
            _ => None,
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of a [`Query`]. Serializes as the bare value
/// (`GetAdmin` → the admin player object, or `null`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryAnswer {
    Admin(Option<Player>),
}
