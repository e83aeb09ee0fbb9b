//! Membership and game-state mutation operations.
//!
//! Every operation takes the registry write lock for its whole duration, so
//! no two mutations of the same room ever interleave, and each successful
//! mutation ends with a fresh `gameStateUpdate` broadcast to the room.
//!
//! Most fire-and-forget operations fail quiet on unknown rooms or users; the
//! next broadcast resynchronizes any observer that acted on stale state.

use super::{elect, AppState, Room, RoomError};
use crate::protocol::{ScoreMethod, ServerMessage};
use crate::types::*;

impl AppState {
    /// Add a user to a room (or overwrite their entry on rejoin) and return
    /// the current host id. The first member to arrive is elected host.
    /// Rescues the room from any pending deletion.
    pub async fn join(
        &self,
        room_id: &str,
        user_id: &str,
        name: &str,
    ) -> Result<UserId, RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;

        Self::cancel_delete(room);

        let was_empty = room.users.is_empty();
        room.users.insert(
            user_id.to_string(),
            User {
                user_id: user_id.to_string(),
                name: name.to_string(),
                team: None,
            },
        );

        if was_empty {
            // Single-member election; this user becomes host.
            let host = elect(&room.users).unwrap_or_default();
            room.state.host_id = host;
            room.broadcast(ServerMessage::NewHost {
                user_id: user_id.to_string(),
                name: name.to_string(),
            });
        }

        tracing::info!(room_id, user_id, name, "user joined");
        room.broadcast_state();
        Ok(room.state.host_id.clone())
    }

    /// Remove a user from a room. Silently ignores unknown rooms and
    /// non-members (lobby clients send speculative leaves).
    pub async fn leave(&self, room_id: &str, user_id: &str) {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(room_id) else {
            return;
        };
        self.leave_room(room_id, room, user_id);
    }

    /// Transport-level connection loss: apply `leave` in every room the user
    /// is found in. A user should only ever be in one room, but the sweep
    /// costs nothing and covers stale bindings.
    pub async fn disconnect(&self, user_id: &str) {
        let mut rooms = self.rooms.write().await;
        let affected: Vec<RoomId> = rooms
            .iter()
            .filter(|(_, room)| room.users.contains_key(user_id))
            .map(|(id, _)| id.clone())
            .collect();

        for room_id in affected {
            if let Some(room) = rooms.get_mut(&room_id) {
                tracing::info!(%room_id, user_id, "user disconnected");
                self.leave_room(&room_id, room, user_id);
            }
        }
    }

    /// Shared removal path for leave/disconnect: drop the entry, re-elect if
    /// the host left, schedule deletion once the room empties.
    fn leave_room(&self, room_id: &str, room: &mut Room, user_id: &str) {
        if room.users.remove(user_id).is_none() {
            return;
        }

        if room.state.host_id == user_id {
            self.elect_new_host(room);
        }

        tracing::info!(room_id, user_id, "user left");
        if room.users.is_empty() {
            self.schedule_delete(room_id, room);
        }
        room.broadcast_state();
    }

    /// Host removes a member. The requester is the connection's bound user
    /// and must currently be host; the original server never checked this,
    /// which let any client kick anyone. Absent targets are a no-op.
    pub async fn kick(
        &self,
        room_id: &str,
        requester_id: &str,
        target_id: &str,
    ) -> Result<(), RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;

        if room.state.host_id != requester_id {
            return Err(RoomError::Forbidden);
        }
        if room.users.remove(target_id).is_none() {
            return Ok(());
        }

        tracing::info!(room_id, target_id, "user kicked");
        // The kicked connection recognizes itself in this broadcast, sends
        // itself `forceLeftRoom`, and unbinds.
        room.broadcast(ServerMessage::UserKicked {
            user_id: target_id.to_string(),
        });

        if room.state.host_id == target_id {
            self.elect_new_host(room);
        }
        if room.users.is_empty() {
            self.schedule_delete(room_id, room);
        }
        room.broadcast_state();
        Ok(())
    }

    fn elect_new_host(&self, room: &mut Room) {
        match elect(&room.users) {
            Some(host_id) => {
                let name = room
                    .users
                    .get(&host_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_default();
                room.state.host_id = host_id.clone();
                tracing::info!(room_id = %room.state.room_id, %host_id, "new host elected");
                room.broadcast(ServerMessage::NewHost {
                    user_id: host_id,
                    name,
                });
            }
            None => room.state.host_id = String::new(),
        }
    }

    /// Point the round at a clue giver. No-op unless the user is a member.
    pub async fn assign_clue_giver(&self, room_id: &str, user_id: &str) {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(room_id) else {
            return;
        };
        if !room.users.contains_key(user_id) {
            return;
        }
        room.state.clue_giver = Some(user_id.to_string());
        room.broadcast_state();
    }

    /// Explicit host transfer, distinct from the automatic election on
    /// leave/kick. Host-only; the target must be a member.
    pub async fn assign_host(
        &self,
        room_id: &str,
        requester_id: &str,
        target_id: &str,
    ) -> Result<(), RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;

        if room.state.host_id != requester_id {
            return Err(RoomError::Forbidden);
        }
        let Some(target) = room.users.get(target_id) else {
            return Ok(());
        };

        let name = target.name.clone();
        room.state.host_id = target_id.to_string();
        tracing::info!(room_id, target_id, "host transferred");
        room.broadcast(ServerMessage::NewHost {
            user_id: target_id.to_string(),
            name,
        });
        room.broadcast_state();
        Ok(())
    }

    /// Dial, screen, and marker are cosmetic last-writer-wins fields; the
    /// value is stored as sent, with no ordering beyond transport order.
    pub async fn update_dial_rotation(&self, room_id: &str, rotation: i32) {
        self.mutate(room_id, |state| state.dial_rotation = rotation)
            .await;
    }

    pub async fn toggle_screen(&self, room_id: &str, open: bool) {
        self.mutate(room_id, |state| state.screen_open = open).await;
    }

    pub async fn randomize_marker(&self, room_id: &str, rotation: i32) {
        self.mutate(room_id, |state| state.marker_rotation = rotation)
            .await;
    }

    /// Adjust one team's score. No floor or ceiling.
    pub async fn update_team_score(
        &self,
        room_id: &str,
        team: Team,
        score: i32,
        method: ScoreMethod,
    ) {
        self.mutate(room_id, |state| {
            let slot = state.scores.get_mut(team);
            match method {
                ScoreMethod::Add => *slot += score,
                ScoreMethod::Subtract => *slot -= score,
            }
        })
        .await;
    }

    pub async fn set_turn(&self, room_id: &str, team: Team) {
        self.mutate(room_id, |state| state.turn = Some(team)).await;
    }

    /// Draw the next word pair without replacement. On exhaustion nothing is
    /// mutated and nothing is broadcast; the caller reports the failure back
    /// to the requester alone.
    pub async fn draw_pair_word(&self, room_id: &str) -> Result<PairWord, RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;

        let pair = crate::words::sample(&mut room.state.all_pair_words)
            .map_err(|_| RoomError::Exhausted)?;
        room.state.pair_words = Some(pair.clone());
        tracing::debug!(room_id, pair = ?pair.words, "word pair drawn");
        room.broadcast_state();
        Ok(pair)
    }

    /// Clear every `used` mark and the current pair, making the whole
    /// catalog drawable again.
    pub async fn reset_pair_words(&self, room_id: &str) {
        self.mutate(room_id, |state| {
            crate::words::reset(&mut state.all_pair_words);
            state.pair_words = None;
        })
        .await;
    }

    /// Apply a plain field mutation and broadcast the result. Fail quiet on
    /// unknown rooms.
    async fn mutate(&self, room_id: &str, f: impl FnOnce(&mut GameState)) {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(room_id) else {
            return;
        };
        f(&mut room.state);
        room.broadcast_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn two_member_room() -> AppState {
        let state = AppState::new();
        state
            .create_room("R1".into(), "Ann".into(), "u-1".into())
            .await
            .unwrap();
        state.join("R1", "u-2", "Bob").await.unwrap();
        state
    }

    #[tokio::test]
    async fn test_join_unknown_room() {
        let state = AppState::new();
        let err = state.join("nope", "u-1", "Ann").await.unwrap_err();
        assert_eq!(err, RoomError::RoomNotFound);
    }

    #[tokio::test]
    async fn test_join_returns_current_host() {
        let state = two_member_room().await;
        let host = state.join("R1", "u-3", "Cyd").await.unwrap();
        assert_eq!(host, "u-1");
    }

    #[tokio::test]
    async fn test_host_invariant_over_join_leave_sequences() {
        let state = AppState::new();
        state
            .create_room("R1".into(), "Ann".into(), "u-1".into())
            .await
            .unwrap();

        for i in 2..6 {
            state
                .join("R1", &format!("u-{}", i), &format!("user {}", i))
                .await
                .unwrap();
        }
        for i in [1, 3, 5, 2, 4] {
            state.leave("R1", &format!("u-{}", i)).await;

            let rooms = state.rooms.read().await;
            let room = rooms.get("R1").unwrap();
            if room.users.is_empty() {
                assert!(room.state.host_id.is_empty());
            } else {
                assert!(
                    room.users.contains_key(&room.state.host_id),
                    "host {} not a member",
                    room.state.host_id
                );
            }
        }
    }

    #[tokio::test]
    async fn test_host_leaving_promotes_a_remaining_member() {
        let state = two_member_room().await;
        state.join("R1", "u-3", "Cyd").await.unwrap();

        state.leave("R1", "u-1").await;

        let snap = state.snapshot("R1").await.unwrap();
        assert!(["u-2", "u-3"].contains(&snap.host_id.as_str()));
    }

    #[tokio::test]
    async fn test_leave_non_member_is_silent() {
        let state = two_member_room().await;
        state.leave("R1", "ghost").await;
        state.leave("no-room", "u-1").await;
        assert_eq!(state.snapshot("R1").await.unwrap().users.len(), 2);
    }

    #[tokio::test]
    async fn test_disconnect_sweeps_rooms() {
        let state = two_member_room().await;
        state
            .create_room("R2".into(), "Bob".into(), "u-2".into())
            .await
            .unwrap();

        state.disconnect("u-2").await;

        assert_eq!(state.snapshot("R1").await.unwrap().users.len(), 1);
        assert!(state.snapshot("R2").await.unwrap().users.is_empty());
    }

    #[tokio::test]
    async fn test_kick_requires_host() {
        let state = two_member_room().await;
        let err = state.kick("R1", "u-2", "u-1").await.unwrap_err();
        assert_eq!(err, RoomError::Forbidden);
        assert_eq!(state.snapshot("R1").await.unwrap().users.len(), 2);
    }

    #[tokio::test]
    async fn test_kick_removes_target() {
        let state = two_member_room().await;
        state.kick("R1", "u-1", "u-2").await.unwrap();

        let snap = state.snapshot("R1").await.unwrap();
        assert_eq!(snap.users.len(), 1);
        assert_eq!(snap.host_id, "u-1");
    }

    #[tokio::test]
    async fn test_kick_absent_target_is_noop() {
        let state = two_member_room().await;
        state.kick("R1", "u-1", "ghost").await.unwrap();
        assert_eq!(state.snapshot("R1").await.unwrap().users.len(), 2);
    }

    #[tokio::test]
    async fn test_kicking_the_host_reelects() {
        let state = two_member_room().await;
        // Hosts kicking themselves is odd but allowed; someone must inherit.
        state.kick("R1", "u-1", "u-1").await.unwrap();

        let snap = state.snapshot("R1").await.unwrap();
        assert_eq!(snap.host_id, "u-2");
    }

    #[tokio::test]
    async fn test_assign_host_requires_host() {
        let state = two_member_room().await;
        let err = state.assign_host("R1", "u-2", "u-2").await.unwrap_err();
        assert_eq!(err, RoomError::Forbidden);
    }

    #[tokio::test]
    async fn test_assign_host_transfers() {
        let state = two_member_room().await;
        state.assign_host("R1", "u-1", "u-2").await.unwrap();
        assert_eq!(state.snapshot("R1").await.unwrap().host_id, "u-2");
    }

    #[tokio::test]
    async fn test_assign_host_to_stranger_is_noop() {
        let state = two_member_room().await;
        state.assign_host("R1", "u-1", "ghost").await.unwrap();
        assert_eq!(state.snapshot("R1").await.unwrap().host_id, "u-1");
    }

    #[tokio::test]
    async fn test_assign_clue_giver_member_only() {
        let state = two_member_room().await;

        state.assign_clue_giver("R1", "u-2").await;
        assert_eq!(
            state.snapshot("R1").await.unwrap().clue_giver,
            Some("u-2".to_string())
        );

        state.assign_clue_giver("R1", "ghost").await;
        assert_eq!(
            state.snapshot("R1").await.unwrap().clue_giver,
            Some("u-2".to_string())
        );
    }

    #[tokio::test]
    async fn test_dial_screen_marker_are_last_writer_wins() {
        let state = two_member_room().await;

        state.update_dial_rotation("R1", 45).await;
        state.update_dial_rotation("R1", -30).await;
        state.toggle_screen("R1", true).await;
        state.randomize_marker("R1", 72).await;

        let snap = state.snapshot("R1").await.unwrap();
        assert_eq!(snap.dial_rotation, -30);
        assert!(snap.screen_open);
        assert_eq!(snap.marker_rotation, 72);
    }

    #[tokio::test]
    async fn test_scores_are_unclamped() {
        let state = two_member_room().await;

        state
            .update_team_score("R1", Team::A, 1, ScoreMethod::Add)
            .await;
        state
            .update_team_score("R1", Team::B, 2, ScoreMethod::Subtract)
            .await;

        let snap = state.snapshot("R1").await.unwrap();
        assert_eq!(snap.scores.team_a, 1);
        assert_eq!(snap.scores.team_b, -2);
    }

    #[tokio::test]
    async fn test_set_turn() {
        let state = two_member_room().await;
        state.set_turn("R1", Team::B).await;
        assert_eq!(state.snapshot("R1").await.unwrap().turn, Some(Team::B));
    }

    #[tokio::test]
    async fn test_draw_pair_word_stores_and_marks() {
        let state = two_member_room().await;
        let pair = state.draw_pair_word("R1").await.unwrap();
        assert!(pair.used);

        let snap = state.snapshot("R1").await.unwrap();
        assert_eq!(snap.pair_words, Some(pair));
        assert_eq!(snap.all_pair_words.iter().filter(|p| p.used).count(), 1);
    }

    #[tokio::test]
    async fn test_two_entry_pool_draw_scenario() {
        let state = AppState::new();
        state
            .create_room("R1".into(), "Ann".into(), "u-1".into())
            .await
            .unwrap();
        {
            let mut rooms = state.rooms.write().await;
            rooms.get_mut("R1").unwrap().state.all_pair_words.truncate(2);
        }

        let first = state.draw_pair_word("R1").await.unwrap();
        let second = state.draw_pair_word("R1").await.unwrap();
        assert_ne!(first.words, second.words);

        let err = state.draw_pair_word("R1").await.unwrap_err();
        assert_eq!(err, RoomError::Exhausted);
        // Failed draw leaves the current pair in place.
        assert_eq!(state.snapshot("R1").await.unwrap().pair_words, Some(second));

        state.reset_pair_words("R1").await;
        assert!(state.snapshot("R1").await.unwrap().pair_words.is_none());
        assert!(state.draw_pair_word("R1").await.is_ok());
    }

    #[tokio::test]
    async fn test_draw_unknown_room() {
        let state = AppState::new();
        let err = state.draw_pair_word("nope").await.unwrap_err();
        assert_eq!(err, RoomError::RoomNotFound);
    }
}
