use crate::types::*;
use serde::{Deserialize, Serialize};

/// Whether a score adjustment adds or subtracts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScoreMethod {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "camelCase")]
pub enum ClientMessage {
    GetAvailableRooms,
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        room: RoomId,
        name: String,
        user_id: UserId,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: RoomId,
        user_id: UserId,
        name: String,
    },
    /// Also sent by clients landing back on the lobby screen, possibly with
    /// a room they never joined. Must be a silent no-op in that case.
    #[serde(rename_all = "camelCase")]
    LeaveRoom {
        room_id: RoomId,
        user_id: UserId,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    AssignHost {
        room_id: RoomId,
        user_id: UserId,
        target_to_host_id: UserId,
    },
    /// `user_id` is the kick target; the requester is the bound connection.
    #[serde(rename_all = "camelCase")]
    KickUser {
        room_id: RoomId,
        user_id: UserId,
    },
    #[serde(rename_all = "camelCase")]
    AssignClueGiver {
        room_id: RoomId,
        user_id: UserId,
    },
    #[serde(rename_all = "camelCase")]
    UpdateDialRotation {
        room_id: RoomId,
        rotation: i32,
        user_name: String,
    },
    #[serde(rename_all = "camelCase")]
    ToggleScreen {
        room_id: RoomId,
        screen_open: bool,
        user_name: String,
    },
    #[serde(rename_all = "camelCase")]
    RandomizeMarker {
        room_id: RoomId,
        rotation: i32,
        user_name: String,
    },
    #[serde(rename_all = "camelCase")]
    UpdateTeamScore {
        room_id: RoomId,
        team: Team,
        score: i32,
        method: ScoreMethod,
    },
    #[serde(rename_all = "camelCase")]
    SetTurnOfTeam {
        room_id: RoomId,
        team: Team,
    },
    // "Thier" is the original client's spelling; it is part of the wire
    // contract and deliberately not corrected here.
    #[serde(rename = "userUpdateThierTeam", rename_all = "camelCase")]
    UserUpdateTheirTeam {
        room_id: RoomId,
        user_id: UserId,
        team: Team,
    },
    #[serde(rename_all = "camelCase")]
    RandomizeTeam {
        room_id: RoomId,
    },
    #[serde(rename_all = "camelCase")]
    RandomPairWord {
        room_id: RoomId,
    },
    #[serde(rename_all = "camelCase")]
    ResetPairWord {
        room_id: RoomId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Full room-id list; broadcast to every connection when the room set
    /// changes, and sent directly as the reply to `getAvailableRooms`.
    UpdateRooms {
        rooms: Vec<RoomId>,
    },
    /// Broadcast to a room's members after any mutating operation.
    GameStateUpdate {
        state: GameState,
    },
    /// Broadcast to a room on host election or explicit transfer.
    #[serde(rename_all = "camelCase")]
    NewHost {
        user_id: UserId,
        name: String,
    },
    /// Broadcast to a room when a member is kicked; the kicked connection
    /// additionally receives `forceLeftRoom`.
    #[serde(rename_all = "camelCase")]
    UserKicked {
        user_id: UserId,
    },
    ForceLeftRoom,
    #[serde(rename_all = "camelCase")]
    CreateRoomResult {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoomResult {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        current_host_id: Option<UserId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    PairWordResult {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Error {
        code: String,
        msg: String,
    },
}
