//! Session coordination for Parlor.
//!
//! Each room runs as an isolated Tokio task (actor model). The actor owns
//! the room's [`RoomState`](parlor_game::RoomState), applies the reducer to
//! one action at a time, and fans the result out to every open connection.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates rooms on first address, tears them down when
//!   empty
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomConfig`]: word list, query reply mode, channel size, seed

mod config;
mod error;
mod manager;
mod room;

pub use config::{QueryReplyMode, RoomConfig};
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{PlayerSender, RoomHandle, RoomInfo, RoomOutbound};
