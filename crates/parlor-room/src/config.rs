//! Room configuration.

use std::fmt;
use std::str::FromStr;

use parlor_game::WordList;

// ---------------------------------------------------------------------------
// QueryReplyMode
// ---------------------------------------------------------------------------

/// Who receives the answer to a query such as `GET_ADMIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryReplyMode {
    /// Every connection in the room gets the answer. This is what existing
    /// clients expect.
    #[default]
    Broadcast,

    /// Only the connection that asked gets the answer.
    Requester,
}

impl fmt::Display for QueryReplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcast => write!(f, "broadcast"),
            Self::Requester => write!(f, "requester"),
        }
    }
}

impl FromStr for QueryReplyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "broadcast" => Ok(Self::Broadcast),
            "requester" => Ok(Self::Requester),
            other => Err(format!(
                "unknown query reply mode {other:?} (expected broadcast or requester)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room a [`RoomManager`](crate::RoomManager)
/// creates.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Candidate secret words for round start.
    pub words: WordList,

    /// Delivery of query answers.
    pub query_replies: QueryReplyMode,

    /// Capacity of each room's command channel. When full, senders wait.
    pub channel_size: usize,

    /// Capacity of each connection's outbound queue. A connection whose
    /// queue is full when a broadcast arrives is dropped from the room.
    pub outbound_size: usize,

    /// Fixed seed for every room's random source. `None` seeds each room
    /// from the OS.
    pub seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            words: WordList::default(),
            query_replies: QueryReplyMode::default(),
            channel_size: 64,
            outbound_size: 256,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.query_replies, QueryReplyMode::Broadcast);
        assert_eq!(config.channel_size, 64);
        assert_eq!(config.outbound_size, 256);
        assert!(config.seed.is_none());
        assert!(!config.words.is_empty());
    }

    #[test]
    fn test_query_reply_mode_parse() {
        assert_eq!(
            "broadcast".parse::<QueryReplyMode>(),
            Ok(QueryReplyMode::Broadcast)
        );
        assert_eq!(
            "Requester".parse::<QueryReplyMode>(),
            Ok(QueryReplyMode::Requester)
        );
        assert!("everyone".parse::<QueryReplyMode>().is_err());
    }

    #[test]
    fn test_query_reply_mode_display_round_trips() {
        for mode in [QueryReplyMode::Broadcast, QueryReplyMode::Requester] {
            assert_eq!(mode.to_string().parse::<QueryReplyMode>(), Ok(mode));
        }
    }
}
