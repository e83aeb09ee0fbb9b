mod host;
mod registry;
mod room;
mod teams;

pub use host::elect;
pub use teams::split_teams;

use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

/// How long an empty room survives before deletion, giving a disconnected
/// member a window to rejoin without losing the room's state.
pub const DELETE_GRACE: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("a room with this id already exists")]
    RoomExists,
    #[error("room not found")]
    RoomNotFound,
    #[error("user is not a member of this room")]
    UserNotMember,
    #[error("every word pair has been used; reset to draw again")]
    Exhausted,
    #[error("only the current host can do this")]
    Forbidden,
}

/// One game session: the membership directory, the shared game state, and
/// the broadcast channel its members' connections listen on.
pub struct Room {
    pub users: HashMap<UserId, User>,
    pub state: GameState,
    pub tx: broadcast::Sender<ServerMessage>,
    /// Armed while the room is empty and waiting out the deletion grace
    /// period; cleared when a join rescues the room.
    pub(crate) pending_delete: Option<JoinHandle<()>>,
}

impl Room {
    pub(crate) fn new(room_id: RoomId, host_id: UserId, pool: Vec<PairWord>) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            users: HashMap::new(),
            state: GameState::new(room_id, host_id, pool),
            tx,
            pending_delete: None,
        }
    }

    /// A fresh snapshot with the `users` list projected from the membership
    /// directory. Membership is never stored on `state` between broadcasts.
    pub fn snapshot(&self) -> GameState {
        let mut state = self.state.clone();
        state.users = self.users.values().cloned().collect();
        state
    }

    /// Send a message to every connection currently joined to this room.
    /// A room with no listening connections is fine; the error just means
    /// there are no receivers.
    pub(crate) fn broadcast(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg);
    }

    pub(crate) fn broadcast_state(&self) {
        self.broadcast(ServerMessage::GameStateUpdate {
            state: self.snapshot(),
        });
    }
}

/// Shared application state: the process-wide room registry plus the lobby
/// broadcast channel every connection subscribes to for room-list updates.
///
/// All room mutation goes through the registry's write lock, so no two
/// operations on the same room (or any room) ever interleave. This is the
/// explicit stand-in for the original's single-threaded event loop.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<RoomId, Room>>>,
    pub lobby_tx: broadcast::Sender<ServerMessage>,
}

impl AppState {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            lobby_tx: tx,
        }
    }

    /// Sender for a room's broadcast channel, used by the socket loop to
    /// subscribe a connection once it binds to the room.
    pub async fn room_channel(&self, room_id: &str) -> Option<broadcast::Sender<ServerMessage>> {
        self.rooms.read().await.get(room_id).map(|r| r.tx.clone())
    }

    /// Fresh game-state snapshot for one room.
    pub async fn snapshot(&self, room_id: &str) -> Option<GameState> {
        self.rooms.read().await.get(room_id).map(|r| r.snapshot())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
