//! Room state and the pure reducer behind Parlor.
//!
//! Everything in this crate is synchronous and free of I/O. The
//! coordinator (`parlor-room`) owns the [`RoomState`] of each room and
//! feeds actions through [`apply`] one at a time.
//!
//! # Key types
//!
//! - [`RoomState`], [`Player`], [`PlayerId`]: the replicated data
//! - [`Action`] / [`Query`]: mutations and read-only requests
//! - [`apply`] / [`find_admin`]: the reducer and its query helper
//! - [`RandomSource`]: injected randomness for round start
//! - [`WordList`]: candidate secret words

mod action;
mod model;
mod random;
mod reducer;
mod words;

pub use action::{Action, ActionKind, Query, QueryAnswer, QueryKind};
pub use model::{Player, PlayerId, RoomState};
pub use random::{RandomSource, SeededRandom};
pub use reducer::{apply, find_admin, ROUND_STARTED};
pub use words::{WordList, WordListError};
