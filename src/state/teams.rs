//! Team randomization: partition the membership into two balanced teams.

use super::AppState;
use crate::types::{Team, UserId};
use rand::seq::SliceRandom;
use rand::Rng;

/// Split `members` into two teams, uniformly at random.
///
/// - 0 members: both empty.
/// - 1 member: coin flip between A and B.
/// - n >= 2: shuffle, split at floor(n/2). Both teams are guaranteed
///   non-empty; if the split ever leaves A empty, one member is moved over
///   from B rather than trusting the split arithmetic alone.
pub fn split_teams(mut members: Vec<UserId>) -> (Vec<UserId>, Vec<UserId>) {
    let mut rng = rand::rng();

    if let [lone] = members.as_slice() {
        let lone = lone.clone();
        return if rng.random_bool(0.5) {
            (vec![lone], vec![])
        } else {
            (vec![], vec![lone])
        };
    }

    members.shuffle(&mut rng);
    let mid = members.len() / 2;
    let team_b = members.split_off(mid);
    let mut team_a = members;

    if team_a.is_empty() && !team_b.is_empty() {
        let mut team_b = team_b;
        team_a.push(team_b.remove(0));
        return (team_a, team_b);
    }

    (team_a, team_b)
}

impl AppState {
    /// Randomize team assignments over the current membership and write the
    /// result back onto each member. Touches nothing but the `team` field.
    /// Fail quiet on unknown rooms.
    pub async fn randomize_teams(&self, room_id: &str) {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(room_id) else {
            return;
        };

        let ids: Vec<UserId> = room.users.keys().cloned().collect();
        let (team_a, team_b) = split_teams(ids);

        for id in &team_a {
            if let Some(user) = room.users.get_mut(id) {
                user.team = Some(Team::A);
            }
        }
        for id in &team_b {
            if let Some(user) = room.users.get_mut(id) {
                user.team = Some(Team::B);
            }
        }

        tracing::debug!(
            room_id,
            team_a = team_a.len(),
            team_b = team_b.len(),
            "randomized teams"
        );
        room.broadcast_state();
    }

    /// A member picks (or switches) their own team. Fail quiet when the room
    /// or the user is unknown.
    pub async fn set_user_team(&self, room_id: &str, user_id: &str, team: Team) {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(room_id) else {
            return;
        };
        let Some(user) = room.users.get_mut(user_id) else {
            return;
        };
        user.team = Some(team);
        room.broadcast_state();
    }
}
