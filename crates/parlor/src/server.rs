//! `ParlorServer` builder and server loop.
//!
//! This is the entry point for running a Parlor room server. It ties the
//! layers together: transport → protocol → room.

use std::sync::Arc;

use parlor_protocol::{Codec, JsonCodec};
use parlor_room::{RoomConfig, RoomManager};
use parlor_transport::{Pending, Transport, WebSocketTransport};

use crate::ParlorError;
use crate::handler::handle_connection;

/// Address used when the builder isn't given one.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:1999";

/// Shared server state passed to each connection handler task.
///
/// Messages travel through the room handle each connection keeps; the
/// manager is only consulted to open or close a connection.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: RoomManager,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Parlor server.
///
/// # Example
///
/// ```rust,no_run
/// use parlor::prelude::*;
///
/// # async fn run() -> Result<(), ParlorError> {
/// let server = ParlorServer::builder()
///     .bind("0.0.0.0:1999")
///     .room_config(RoomConfig {
///         query_replies: QueryReplyMode::Requester,
///         ..RoomConfig::default()
///     })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ParlorServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl ParlorServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration every room is created with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the listener. Uses `JsonCodec` over `WebSocketTransport`.
    pub async fn build(self) -> Result<ParlorServer<JsonCodec>, ParlorError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        tracing::info!(
            addr = %self.bind_addr,
            words = self.room_config.words.len(),
            query_replies = %self.room_config.query_replies,
            seeded = self.room_config.seed.is_some(),
            "server configured"
        );

        let state = Arc::new(ServerState {
            rooms: RoomManager::new(self.room_config),
            codec: JsonCodec,
        });

        Ok(ParlorServer { transport, state })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Parlor server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ParlorServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ParlorServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }
}

impl<C: Codec> ParlorServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    ///
    /// The WebSocket handshake happens inside the spawned task, so the loop
    /// goes straight back to accepting.
    pub async fn run(mut self) -> Result<(), ParlorError> {
        tracing::info!("Parlor server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let peer = pending.peer_addr();
                        let conn = match pending.establish().await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(
                                    %peer,
                                    error = %e,
                                    "handshake failed"
                                );
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
