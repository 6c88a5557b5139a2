//! # Parlor
//!
//! Room server for a browser party game in which one player per round is
//! the imposter and everyone else gets a secret word.
//!
//! Clients connect over WebSocket to `/<anything>/<room id>`. Each room is
//! an actor that owns the room state, applies every action through a pure
//! reducer, and broadcasts the full resulting state to everyone in the
//! room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parlor::prelude::*;
//!
//! # async fn run() -> Result<(), ParlorError> {
//! let server = ParlorServer::builder()
//!     .bind("0.0.0.0:1999")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
pub mod logging;
mod server;

pub use error::ParlorError;
pub use handler::PLAYER_ID_PARAM;
pub use server::{DEFAULT_BIND_ADDR, ParlorServer, ParlorServerBuilder};

/// Everything needed to configure and run a server, plus the game and wire
/// types for working with what it sends.
pub mod prelude {
    pub use crate::{ParlorError, ParlorServer, ParlorServerBuilder};
    pub use parlor_game::{
        Action, ActionKind, Player, PlayerId, Query, QueryAnswer, QueryKind,
        RoomState, WordList,
    };
    pub use parlor_protocol::{ClientMessage, RoomId, ServerMessage};
    pub use parlor_room::{QueryReplyMode, RoomConfig};
}
