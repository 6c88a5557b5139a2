//! Room manager: creates rooms on first address and forgets them once
//! their actor has stopped.

use std::collections::HashMap;

use parlor_game::{PlayerId, RoomState};
use parlor_protocol::RoomId;
use tokio::sync::Mutex;

use crate::room::spawn_room;
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Tracks every live room by ID.
///
/// The map lock is held only to look up, insert or remove a handle; every
/// round trip to a room actor happens after it is released, so a backed-up
/// room never delays opens and closes elsewhere.
///
/// A room actor stops by itself when its last connection leaves. The
/// manager removes the handle afterwards, but only if the map still holds
/// that same actor.
pub struct RoomManager {
    rooms: Mutex<HashMap<RoomId, RoomHandle>>,
    config: RoomConfig,
}

impl RoomManager {
    /// Creates an empty manager. Every room it spawns gets a copy of
    /// `config`.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Opens a connection in `room_id`, creating the room if this is the
    /// first connection to address it.
    ///
    /// Returns the handle the connection should use for its messages.
    pub async fn open(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<RoomHandle, RoomError> {
        loop {
            let handle = self.room_or_spawn(&room_id).await;
            match handle.open(player_id.clone(), sender.clone()).await {
                Ok(()) => return Ok(handle),
                // The actor emptied and stopped after we looked it up.
                Err(RoomError::Unavailable(_)) => self.forget(&handle).await,
                Err(e) => return Err(e),
            }
        }
    }

    /// Closes a connection. The room goes away once nobody is left.
    pub async fn close(
        &self,
        room_id: &RoomId,
        player_id: PlayerId,
    ) -> Result<(), RoomError> {
        let handle = self
            .room(room_id)
            .await
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        match handle.close(player_id).await {
            Ok(0) | Err(RoomError::Unavailable(_)) => {
                self.forget(&handle).await;
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Returns the handle for a live room.
    pub async fn room(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.lock().await.get(room_id).cloned()
    }

    /// Returns the current game state of a room.
    pub async fn snapshot(
        &self,
        room_id: &RoomId,
    ) -> Result<RoomState, RoomError> {
        Ok(self.info(room_id).await?.state)
    }

    /// Returns the game state and open connections of a room.
    pub async fn info(&self, room_id: &RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self
            .room(room_id)
            .await
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.info().await
    }

    /// Shuts a room down and forgets it.
    pub async fn destroy_room(&self, room_id: &RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .lock()
            .await
            .remove(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        // The actor may already be gone; nothing to do then.
        let _ = handle.shutdown().await;
        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    /// Returns the number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    pub async fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.lock().await.keys().cloned().collect()
    }

    async fn room_or_spawn(&self, room_id: &RoomId) -> RoomHandle {
        self.rooms
            .lock()
            .await
            .entry(room_id.clone())
            .or_insert_with(|| {
                tracing::info!(%room_id, "room created");
                spawn_room(room_id.clone(), self.config.clone())
            })
            .clone()
    }

    /// Removes `handle`'s room from the map if it still maps to that actor.
    async fn forget(&self, handle: &RoomHandle) {
        let mut rooms = self.rooms.lock().await;
        let current = rooms
            .get(handle.room_id())
            .is_some_and(|live| live.same_room(handle));
        if current {
            rooms.remove(handle.room_id());
            tracing::info!(room_id = %handle.room_id(), "room removed");
        }
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn room(id: &str) -> RoomId {
        RoomId::new(id)
    }

    #[tokio::test]
    async fn test_first_open_creates_room() {
        let manager = RoomManager::default();
        let (tx, _rx) = mpsc::channel(8);

        manager
            .open(room("R1"), PlayerId::new("a"), tx)
            .await
            .unwrap();

        assert_eq!(manager.room_count().await, 1);
        assert!(manager.room(&room("R1")).await.is_some());
        assert_eq!(manager.room_ids().await, vec![room("R1")]);
    }

    #[tokio::test]
    async fn test_second_open_reuses_room() {
        let manager = RoomManager::default();
        let (tx_a, _rx_a) = mpsc::channel(8);
        let (tx_b, _rx_b) = mpsc::channel(8);

        let a = manager.open(room("R1"), PlayerId::new("a"), tx_a).await.unwrap();
        let b = manager.open(room("R1"), PlayerId::new("b"), tx_b).await.unwrap();

        assert!(a.same_room(&b));
        assert_eq!(manager.room_count().await, 1);
        let state = manager.snapshot(&room("R1")).await.unwrap();
        assert_eq!(state.players.len(), 2);
    }

    #[tokio::test]
    async fn test_last_close_destroys_room() {
        let manager = RoomManager::default();
        let (tx_a, _rx_a) = mpsc::channel(8);
        let (tx_b, _rx_b) = mpsc::channel(8);

        manager.open(room("R1"), PlayerId::new("a"), tx_a).await.unwrap();
        manager.open(room("R1"), PlayerId::new("b"), tx_b).await.unwrap();

        manager.close(&room("R1"), PlayerId::new("a")).await.unwrap();
        assert_eq!(manager.room_count().await, 1);

        manager.close(&room("R1"), PlayerId::new("b")).await.unwrap();
        assert_eq!(manager.room_count().await, 0);
        assert!(matches!(
            manager.snapshot(&room("R1")).await,
            Err(RoomError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_close_unknown_room() {
        let manager = RoomManager::default();
        let result = manager.close(&room("nope"), PlayerId::new("a")).await;
        assert!(matches!(result, Err(RoomError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_open_rejected_and_room_kept() {
        let manager = RoomManager::default();
        let (tx_a, _rx_a) = mpsc::channel(8);
        let (tx_dup, _rx_dup) = mpsc::channel(8);

        manager.open(room("R1"), PlayerId::new("a"), tx_a).await.unwrap();
        let result = manager.open(room("R1"), PlayerId::new("a"), tx_dup).await;

        assert!(matches!(result, Err(RoomError::DuplicatePlayer(_, _))));
        assert_eq!(manager.room_count().await, 1);
        let state = manager.snapshot(&room("R1")).await.unwrap();
        assert_eq!(state.players.len(), 1);
    }

    #[tokio::test]
    async fn test_open_replaces_stopped_room() {
        let manager = RoomManager::default();
        let (tx_a, _rx_a) = mpsc::channel(8);
        let old = manager.open(room("R1"), PlayerId::new("a"), tx_a).await.unwrap();

        // Stop the actor behind the manager's back; the map still has it.
        old.shutdown().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(manager.room(&room("R1")).await.is_some());

        let (tx_b, _rx_b) = mpsc::channel(8);
        let new = manager.open(room("R1"), PlayerId::new("b"), tx_b).await.unwrap();

        assert!(!new.same_room(&old));
        let state = manager.snapshot(&room("R1")).await.unwrap();
        assert_eq!(state.event_log, vec!["User b joined the game."]);
    }

    #[tokio::test]
    async fn test_forget_leaves_newer_room_alone() {
        let manager = RoomManager::default();
        let (tx_a, _rx_a) = mpsc::channel(8);
        let old = manager.open(room("R1"), PlayerId::new("a"), tx_a).await.unwrap();
        manager.close(&room("R1"), PlayerId::new("a")).await.unwrap();

        let (tx_b, _rx_b) = mpsc::channel(8);
        manager.open(room("R1"), PlayerId::new("b"), tx_b).await.unwrap();

        // A late cleanup for the first actor must not remove the second.
        manager.forget(&old).await;
        assert_eq!(manager.room_count().await, 1);
        assert_eq!(manager.snapshot(&room("R1")).await.unwrap().players.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_flooded_room_does_not_hold_up_other_rooms() {
        let manager = RoomManager::new(RoomConfig {
            channel_size: 1,
            ..RoomConfig::default()
        });
        let (tx_a, mut rx_a) = mpsc::channel(100_000);
        let busy = manager.open(room("BUSY"), PlayerId::new("a"), tx_a).await.unwrap();

        let flood = tokio::spawn(async move {
            for i in 0..20_000 {
                let msg = parlor_protocol::ClientMessage::Action(
                    parlor_game::Action::AppendLog(format!("m{i}")),
                );
                if busy.send_message(PlayerId::new("a"), msg).await.is_err() {
                    break;
                }
            }
        });
        let drain = tokio::spawn(async move { while rx_a.recv().await.is_some() {} });

        for i in 0..20 {
            let (tx, _rx) = mpsc::channel(8);
            let opened = tokio::time::timeout(
                std::time::Duration::from_secs(2),
                manager.open(room(&format!("QUIET{i}")), PlayerId::new("x"), tx),
            )
            .await
            .expect("open elsewhere must not wait on the busy room");
            opened.unwrap();
        }

        flood.abort();
        drain.abort();
    }

    #[tokio::test]
    async fn test_destroy_room_twice() {
        let manager = RoomManager::default();
        let (tx, _rx) = mpsc::channel(8);
        manager.open(room("R1"), PlayerId::new("a"), tx).await.unwrap();

        manager.destroy_room(&room("R1")).await.unwrap();
        assert!(matches!(
            manager.destroy_room(&room("R1")).await,
            Err(RoomError::NotFound(_))
        ));
    }
}
