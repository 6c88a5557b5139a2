//! Wire protocol for Parlor.
//!
//! - **Types** ([`Inbound`], [`ClientMessage`], [`ServerMessage`],
//!   [`RoomId`]): the shapes that travel over a connection.
//! - **Codec** ([`Codec`], [`JsonCodec`]): how they become bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing that.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room (Action / Query)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{ClientMessage, Inbound, RoomId, ServerMessage};
