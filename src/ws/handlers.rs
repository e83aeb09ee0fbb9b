//! Message dispatch: one inbound client message in, an optional direct
//! reply out. Room mutations and broadcasts happen inside the state
//! operations; the dispatcher itself holds no game state beyond the
//! per-connection binding.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, RoomError};
use crate::types::{RoomId, UserId};

/// Which room and user a connection currently acts as. A connection binds on
/// a successful `createRoom`/`joinRoom` and unbinds on leave, kick, or
/// disconnect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    pub room_id: Option<RoomId>,
    pub user_id: Option<UserId>,
}

impl Binding {
    pub fn bind(&mut self, room_id: &str, user_id: &str) {
        self.room_id = Some(room_id.to_string());
        self.user_id = Some(user_id.to_string());
    }

    pub fn clear(&mut self) {
        self.room_id = None;
        self.user_id = None;
    }
}

fn forbidden(err: RoomError) -> Option<ServerMessage> {
    match err {
        RoomError::Forbidden => Some(ServerMessage::Error {
            code: "FORBIDDEN".to_string(),
            msg: err.to_string(),
        }),
        // Fail quiet for everything else; the next broadcast resyncs.
        _ => None,
    }
}

/// Handle one client message and return the optional direct reply.
pub async fn handle_message(
    msg: ClientMessage,
    binding: &mut Binding,
    state: &AppState,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::GetAvailableRooms => Some(ServerMessage::UpdateRooms {
            rooms: state.available_rooms().await,
        }),

        ClientMessage::CreateRoom {
            room,
            name,
            user_id,
        } => match state.create_room(room.clone(), name, user_id.clone()).await {
            Ok(()) => {
                binding.bind(&room, &user_id);
                Some(ServerMessage::CreateRoomResult {
                    success: true,
                    message: None,
                })
            }
            Err(err) => Some(ServerMessage::CreateRoomResult {
                success: false,
                message: Some(err.to_string()),
            }),
        },

        ClientMessage::JoinRoom {
            room_id,
            user_id,
            name,
        } => match state.join(&room_id, &user_id, &name).await {
            Ok(host_id) => {
                binding.bind(&room_id, &user_id);
                Some(ServerMessage::JoinRoomResult {
                    success: true,
                    current_host_id: Some(host_id),
                    message: None,
                })
            }
            Err(err) => Some(ServerMessage::JoinRoomResult {
                success: false,
                current_host_id: None,
                message: Some(err.to_string()),
            }),
        },

        ClientMessage::LeaveRoom {
            room_id, user_id, ..
        } => {
            state.leave(&room_id, &user_id).await;
            // Lobby clients send speculative leaves with stale room ids; only
            // a leave for the bound room unbinds, or the disconnect sweep for
            // the real room would never run.
            if binding.room_id.as_deref() == Some(room_id.as_str())
                && binding.user_id.as_deref() == Some(user_id.as_str())
            {
                binding.clear();
            }
            None
        }

        ClientMessage::AssignHost {
            room_id,
            target_to_host_id,
            ..
        } => {
            let requester = binding.user_id.clone().unwrap_or_default();
            match state
                .assign_host(&room_id, &requester, &target_to_host_id)
                .await
            {
                Ok(()) => None,
                Err(err) => forbidden(err),
            }
        }

        ClientMessage::KickUser { room_id, user_id } => {
            let requester = binding.user_id.clone().unwrap_or_default();
            match state.kick(&room_id, &requester, &user_id).await {
                Ok(()) => None,
                Err(err) => forbidden(err),
            }
        }

        ClientMessage::AssignClueGiver { room_id, user_id } => {
            state.assign_clue_giver(&room_id, &user_id).await;
            None
        }

        ClientMessage::UpdateDialRotation {
            room_id, rotation, ..
        } => {
            state.update_dial_rotation(&room_id, rotation).await;
            None
        }

        ClientMessage::ToggleScreen {
            room_id,
            screen_open,
            ..
        } => {
            state.toggle_screen(&room_id, screen_open).await;
            None
        }

        ClientMessage::RandomizeMarker {
            room_id, rotation, ..
        } => {
            state.randomize_marker(&room_id, rotation).await;
            None
        }

        ClientMessage::UpdateTeamScore {
            room_id,
            team,
            score,
            method,
        } => {
            state.update_team_score(&room_id, team, score, method).await;
            None
        }

        ClientMessage::SetTurnOfTeam { room_id, team } => {
            state.set_turn(&room_id, team).await;
            None
        }

        ClientMessage::UserUpdateTheirTeam {
            room_id,
            user_id,
            team,
        } => {
            state.set_user_team(&room_id, &user_id, team).await;
            None
        }

        ClientMessage::RandomizeTeam { room_id } => {
            state.randomize_teams(&room_id).await;
            None
        }

        ClientMessage::RandomPairWord { room_id } => match state.draw_pair_word(&room_id).await {
            Ok(_) => Some(ServerMessage::PairWordResult {
                success: true,
                message: None,
            }),
            Err(err) => Some(ServerMessage::PairWordResult {
                success: false,
                message: Some(err.to_string()),
            }),
        },

        ClientMessage::ResetPairWord { room_id } => {
            state.reset_pair_words(&room_id).await;
            None
        }
    }
}
