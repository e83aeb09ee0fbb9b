//! Room registry: creation, lookup, and deferred deletion of empty rooms.

use super::{AppState, Room, RoomError, DELETE_GRACE};
use crate::protocol::ServerMessage;
use crate::types::*;
use crate::words;
use std::collections::HashMap;

impl AppState {
    /// Create a room whose only member is the creator, who becomes host.
    /// Fails with `RoomExists` for a duplicate id and never overwrites.
    pub async fn create_room(
        &self,
        room_id: RoomId,
        creator_name: String,
        creator_id: UserId,
    ) -> Result<(), RoomError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room_id) {
            return Err(RoomError::RoomExists);
        }

        let mut room = Room::new(room_id.clone(), creator_id.clone(), words::fresh_pool());
        room.users.insert(
            creator_id.clone(),
            User {
                user_id: creator_id,
                name: creator_name.clone(),
                team: None,
            },
        );

        tracing::info!(%room_id, creator = %creator_name, "room created");
        rooms.insert(room_id, room);
        self.broadcast_room_list(&rooms);
        Ok(())
    }

    /// The current list of room ids, sorted for a stable lobby display.
    pub async fn available_rooms(&self) -> Vec<RoomId> {
        let rooms = self.rooms.read().await;
        let mut list: Vec<RoomId> = rooms.keys().cloned().collect();
        list.sort();
        list
    }

    pub(crate) fn broadcast_room_list(&self, rooms: &HashMap<RoomId, Room>) {
        let mut list: Vec<RoomId> = rooms.keys().cloned().collect();
        list.sort();
        let _ = self.lobby_tx.send(ServerMessage::UpdateRooms { rooms: list });
    }

    /// Arm the one-shot deletion timer for a now-empty room. A no-op while a
    /// timer is already armed. At fire time the room is deleted only if it is
    /// still empty; a join that lands first wins the race because both sides
    /// go through the registry write lock.
    pub(crate) fn schedule_delete(&self, room_id: &str, room: &mut Room) {
        if room.pending_delete.is_some() {
            return;
        }

        tracing::info!(room_id, grace = ?DELETE_GRACE, "room empty, deletion scheduled");
        let state = self.clone();
        let room_id = room_id.to_string();
        room.pending_delete = Some(tokio::spawn(async move {
            tokio::time::sleep(DELETE_GRACE).await;

            let mut rooms = state.rooms.write().await;
            match rooms.get(&room_id).map(|room| room.users.is_empty()) {
                Some(true) => {
                    rooms.remove(&room_id);
                    tracing::info!(%room_id, "empty room deleted");
                    state.broadcast_room_list(&rooms);
                }
                Some(false) => {
                    // Rescued but the timer was never cancelled; disarm.
                    if let Some(room) = rooms.get_mut(&room_id) {
                        room.pending_delete = None;
                    }
                }
                None => {}
            }
        }));
    }

    /// Disarm any pending deletion; called when a join rescues the room
    /// mid-grace-period.
    pub(crate) fn cancel_delete(room: &mut Room) {
        if let Some(timer) = room.pending_delete.take() {
            timer.abort();
        }
    }
}
