//! Per-connection handler: room binding and message pumping.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Pick the room from the request path, the player id from `_pk`
//!   2. Open the connection in the room (the room broadcasts `ADD_USER`)
//!   3. Loop: forward inbound frames to the room, room broadcasts to the
//!      socket
//!   4. Close the connection in the room (the room broadcasts
//!      `REMOVE_USER`, or is torn down if now empty)

use std::sync::Arc;

use parlor_game::PlayerId;
use parlor_protocol::{Codec, RoomId, ServerMessage};
use parlor_room::{RoomHandle, RoomOutbound};
use parlor_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ParlorError;
use crate::server::ServerState;

/// Query parameter PartySocket clients use to carry their connection id.
pub const PLAYER_ID_PARAM: &str = "_pk";

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ParlorError> {
    let conn_id = conn.id();
    let target = conn.target();

    let Some(room_id) = RoomId::from_path(&target.path) else {
        let path = target.path.clone();
        let _ = conn.close().await;
        return Err(ParlorError::NoRoom(path));
    };
    let player_id = target
        .query_param(PLAYER_ID_PARAM)
        .map(PlayerId::from)
        .unwrap_or_else(|| PlayerId::new(conn_id.to_string()));

    let (tx, mut outbound) =
        mpsc::channel(state.rooms.config().outbound_size.max(1));

    let opened = state.rooms.open(room_id.clone(), player_id.clone(), tx).await;
    let handle = match opened {
        Ok(handle) => handle,
        Err(e) => {
            tracing::info!(%conn_id, %room_id, %player_id, error = %e, "open rejected");
            let _ = conn.close().await;
            return Err(e.into());
        }
    };

    tracing::info!(%conn_id, %room_id, %player_id, "connection opened");

    let result =
        pump(&conn, &handle, &player_id, &mut outbound, &state.codec).await;

    if let Err(e) = state.rooms.close(&room_id, player_id.clone()).await {
        tracing::debug!(%room_id, %player_id, error = %e, "close failed");
    }
    let _ = conn.close().await;

    tracing::info!(%conn_id, %room_id, %player_id, "connection closed");
    result
}

/// Moves frames in both directions until either side goes away.
async fn pump(
    conn: &WebSocketConnection,
    room: &RoomHandle,
    player_id: &PlayerId,
    outbound: &mut mpsc::Receiver<RoomOutbound>,
    codec: &impl Codec,
) -> Result<(), ParlorError> {
    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(data)) => {
                    room.send_raw(player_id.clone(), &data, codec).await?;
                }
                Ok(None) => {
                    tracing::debug!(%player_id, "client closed the connection");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            },
            msg = outbound.recv() => match msg {
                Some(msg) => send_message(conn, codec, &msg).await?,
                // The room dropped us: it stopped, or our queue overflowed.
                None => {
                    tracing::debug!(%player_id, "room went away");
                    return Ok(());
                }
            },
        }
    }
}

/// Encodes a server message and writes it as a text frame. Browser
/// clients `JSON.parse` what they receive, so binary is only a fallback
/// for codecs that don't produce UTF-8.
async fn send_message(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    msg: &ServerMessage,
) -> Result<(), ParlorError> {
    let bytes = codec.encode(msg)?;
    match String::from_utf8(bytes) {
        Ok(text) => conn.send_text(&text).await?,
        Err(e) => conn.send(e.as_bytes()).await?,
    }
    Ok(())
}
