//! Room actor: an isolated Tokio task that owns one room's state.
//!
//! Every connect, disconnect and message for a room becomes a command on
//! the actor's channel. The actor handles one command to completion
//! (reducer + broadcast enqueue) before taking the next, so the reducer
//! never sees two actions at once and broadcasts go out in the order the
//! actions were accepted. Rooms share nothing; a slow room never holds up
//! another.

use std::sync::Arc;

use parlor_game::{Action, PlayerId, Query, RoomState, SeededRandom};
use parlor_protocol::{ClientMessage, Codec, RoomId, ServerMessage};
use tokio::sync::{mpsc, oneshot};

use crate::{QueryReplyMode, RoomConfig, RoomError};

/// A message on its way to one connection. Shared between all recipients
/// of the same broadcast.
pub type RoomOutbound = Arc<ServerMessage>;

/// Channel sender for delivering outbound messages to a connection.
///
/// Bounded by [`RoomConfig::outbound_size`]. The actor never waits on it: a
/// connection whose queue is full is dropped from the room instead.
pub type PlayerSender = mpsc::Sender<RoomOutbound>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// A connection opened.
    Open {
        player_id: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// A connection closed. Replies with the number of connections left;
    /// at zero the actor stops.
    Close {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    /// A decoded message from a connection.
    Message {
        sender: PlayerId,
        msg: ClientMessage,
    },

    /// Request a copy of the current state and connection list.
    Snapshot {
        reply: oneshot::Sender<RoomInfo>,
    },

    /// Shut down the room.
    Shutdown,
}

/// A point-in-time view of a room.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    /// The replicated game state.
    pub state: RoomState,
    /// Open connections, in the order they joined.
    pub connections: Vec<PlayerId>,
}

/// Handle to a running room actor.
///
/// Cheap to clone: it's an `mpsc::Sender` and the room's ID. Once the
/// actor has stopped, every call returns [`RoomError::Unavailable`].
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Registers a connection and adds its player to the room.
    pub async fn open(
        &self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Open {
            player_id,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Unregisters a connection and removes its player. Returns how many
    /// connections remain open.
    pub async fn close(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Close {
            player_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Queues a decoded message (fire-and-forget).
    pub async fn send_message(
        &self,
        sender: PlayerId,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Message { sender, msg }).await
    }

    /// Decodes raw bytes and queues the result.
    ///
    /// Payloads that don't decode, or name an unknown `type`, are dropped
    /// here: nothing reaches the room and nothing is sent back.
    pub async fn send_raw(
        &self,
        sender: PlayerId,
        data: &[u8],
        codec: &impl Codec,
    ) -> Result<(), RoomError> {
        match ClientMessage::decode(codec, data) {
            Ok(msg) => self.send_message(sender, msg).await,
            Err(e) => {
                tracing::debug!(
                    room_id = %self.room_id,
                    player_id = %sender,
                    error = %e,
                    "dropping inbound message"
                );
                Ok(())
            }
        }
    }

    /// Requests a snapshot of the room.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    /// Whether both handles talk to the same actor.
    pub fn same_room(&self, other: &RoomHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    config: RoomConfig,
    state: RoomState,
    /// Open connections in join order.
    connections: Vec<(PlayerId, PlayerSender)>,
    rng: SeededRandom,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Connections whose outbound queue overflowed during a broadcast.
    lagging: Vec<PlayerId>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown or until
    /// the last connection leaves.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Open {
                    player_id,
                    sender,
                    reply,
                } => {
                    let result = self.handle_open(player_id, sender);
                    self.evict_lagging();
                    let _ = reply.send(result);
                }
                RoomCommand::Close { player_id, reply } => {
                    let result = self.handle_close(player_id);
                    self.evict_lagging();
                    let _ = reply.send(result.map(|_| self.connections.len()));
                }
                RoomCommand::Message { sender, msg } => {
                    self.handle_message(sender, msg);
                    self.evict_lagging();
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.info());
                    continue;
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }

            if self.connections.is_empty() {
                tracing::info!(room_id = %self.room_id, "room empty");
                break;
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_open(
        &mut self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if self.is_connected(&player_id) || self.state.contains(&player_id) {
            return Err(RoomError::DuplicatePlayer(
                player_id,
                self.room_id.clone(),
            ));
        }

        self.connections.push((player_id.clone(), sender));
        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            connections = self.connections.len(),
            "player connected"
        );

        self.apply_and_broadcast(Action::AddPlayer(player_id));
        Ok(())
    }

    fn handle_close(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let index = self
            .connections
            .iter()
            .position(|(id, _)| *id == player_id)
            .ok_or_else(|| {
                RoomError::NotInRoom(player_id.clone(), self.room_id.clone())
            })?;
        self.connections.remove(index);

        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            connections = self.connections.len(),
            "player disconnected"
        );

        self.apply_and_broadcast(Action::RemovePlayer(player_id));
        Ok(())
    }

    /// Drops every connection that couldn't keep up and removes its player,
    /// broadcasting each removal to the rest.
    fn evict_lagging(&mut self) {
        while let Some(player_id) = self.lagging.pop() {
            let Some(index) =
                self.connections.iter().position(|(id, _)| *id == player_id)
            else {
                continue;
            };
            // Dropping the sender ends the connection's outbound stream.
            self.connections.remove(index);

            tracing::warn!(
                room_id = %self.room_id,
                %player_id,
                "outbound queue full, dropping connection"
            );
            self.apply_and_broadcast(Action::RemovePlayer(player_id));
        }
    }

    fn handle_message(&mut self, sender: PlayerId, msg: ClientMessage) {
        if !self.is_connected(&sender) {
            tracing::warn!(
                room_id = %self.room_id,
                %sender,
                "message from non-member, ignoring"
            );
            return;
        }

        match msg {
            ClientMessage::Action(Action::AddPlayer(id))
                if self.state.contains(&id) =>
            {
                tracing::debug!(
                    room_id = %self.room_id,
                    %sender,
                    player_id = %id,
                    "duplicate ADD_USER, ignoring"
                );
            }
            ClientMessage::Action(action) => {
                tracing::debug!(
                    room_id = %self.room_id,
                    %sender,
                    action = %action.kind(),
                    "applying action"
                );
                self.apply_and_broadcast(action);
            }
            ClientMessage::Query(query) => self.answer(sender, query),
        }
    }

    fn apply_and_broadcast(&mut self, action: Action) {
        let kind = action.kind();
        let state = std::mem::take(&mut self.state);
        self.state =
            parlor_game::apply(state, action, &self.config.words, &mut self.rng);
        self.broadcast(ServerMessage::state(self.state.clone(), kind));
    }

    fn answer(&mut self, sender: PlayerId, query: Query) {
        let reply = ServerMessage::reply(query.answer(&self.state), query.kind());
        match self.config.query_replies {
            QueryReplyMode::Broadcast => self.broadcast(reply),
            QueryReplyMode::Requester => self.send_to(&sender, Arc::new(reply)),
        }
    }

    /// Enqueues a message for every open connection.
    fn broadcast(&mut self, msg: ServerMessage) {
        let msg = Arc::new(msg);
        for (player_id, sender) in &self.connections {
            if !deliver(&self.room_id, player_id, sender, Arc::clone(&msg)) {
                self.lagging.push(player_id.clone());
            }
        }
    }

    fn send_to(&mut self, player_id: &PlayerId, msg: RoomOutbound) {
        let delivered = self
            .connections
            .iter()
            .find(|(id, _)| id == player_id)
            .is_none_or(|(_, sender)| {
                deliver(&self.room_id, player_id, sender, msg)
            });
        if !delivered {
            self.lagging.push(player_id.clone());
        }
    }

    fn is_connected(&self, player_id: &PlayerId) -> bool {
        self.connections.iter().any(|(id, _)| id == player_id)
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            state: self.state.clone(),
            connections: self
                .connections
                .iter()
                .map(|(id, _)| id.clone())
                .collect(),
        }
    }
}

/// Sends to one connection without waiting. Returns `false` when the
/// connection's queue is full.
///
/// A receiver that's gone (the connection is closing) counts as delivered;
/// its Close command is already on the way.
fn deliver(
    room_id: &RoomId,
    player_id: &PlayerId,
    sender: &PlayerSender,
    msg: RoomOutbound,
) -> bool {
    match sender.try_send(msg) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => false,
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::trace!(%room_id, %player_id, "outbound channel closed");
            true
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
pub(crate) fn spawn_room(room_id: RoomId, config: RoomConfig) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));
    let rng = match config.seed {
        Some(seed) => SeededRandom::seeded(seed),
        None => SeededRandom::from_os(),
    };

    let actor = RoomActor {
        room_id: room_id.clone(),
        config,
        state: RoomState::new(),
        connections: Vec::new(),
        rng,
        receiver: rx,
        lagging: Vec::new(),
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
