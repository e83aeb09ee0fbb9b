use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type RoomId = String;
pub type UserId = String;

/// The two sides of a room. Serialized as `teamA`/`teamB` to match the
/// wire format the browser client expects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Team {
    #[serde(rename = "teamA")]
    A,
    #[serde(rename = "teamB")]
    B,
}

/// A member of a room. `user_id` is a client-generated UUID that stays
/// stable across reconnects; `name` is whatever the user typed in the lobby.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
}

/// Per-team scores. Signed and unclamped: the host can push a score below
/// zero with repeated `-` adjustments, and the client renders it as-is.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scores {
    #[serde(rename = "teamA")]
    pub team_a: i32,
    #[serde(rename = "teamB")]
    pub team_b: i32,
}

impl Scores {
    pub fn get_mut(&mut self, team: Team) -> &mut i32 {
        match team {
            Team::A => &mut self.team_a,
            Team::B => &mut self.team_b,
        }
    }
}

/// One spectrum prompt: a pair of opposing concept words plus a per-room
/// `used` mark for sampling without replacement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairWord {
    pub words: (String, String),
    pub used: bool,
}

/// Snapshot of one room's shared game state, broadcast to every member
/// after each mutation. The `users` list is always projected fresh from the
/// membership directory at broadcast time so it can never drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub room_id: RoomId,
    pub host_id: UserId,
    pub clue_giver: Option<UserId>,
    pub turn: Option<Team>,
    pub scores: Scores,
    pub pair_words: Option<PairWord>,
    pub all_pair_words: Vec<PairWord>,
    pub dial_rotation: i32,
    pub screen_open: bool,
    pub marker_rotation: i32,
    pub users: Vec<User>,
}

impl GameState {
    /// A fresh state for a newly created room: full unused word pool, zero
    /// scores, dial and marker at rest, screen closed.
    pub fn new(room_id: RoomId, host_id: UserId, pool: Vec<PairWord>) -> Self {
        Self {
            room_id,
            host_id,
            clue_giver: None,
            turn: None,
            scores: Scores::default(),
            pair_words: None,
            all_pair_words: pool,
            dial_rotation: 0,
            screen_open: false,
            marker_rotation: 0,
            users: Vec::new(),
        }
    }
}
