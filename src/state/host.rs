//! Host election. Used both for "first joiner becomes host" and for picking
//! a replacement when the host leaves or is kicked. Uniform randomness keeps
//! the choice free of any bias toward whoever happens to sort first.

use crate::types::{User, UserId};
use rand::seq::IteratorRandom;
use std::collections::HashMap;

/// Pick a host uniformly at random from the members, or `None` if there is
/// nobody left to elect.
pub fn elect(members: &HashMap<UserId, User>) -> Option<UserId> {
    let mut rng = rand::rng();
    members.keys().choose(&mut rng).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(ids: &[&str]) -> HashMap<UserId, User> {
        ids.iter()
            .map(|id| {
                (
                    id.to_string(),
                    User {
                        user_id: id.to_string(),
                        name: format!("user {}", id),
                        team: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_elect_empty_is_none() {
        assert_eq!(elect(&HashMap::new()), None);
    }

    #[test]
    fn test_elect_single_member() {
        assert_eq!(elect(&members(&["u-1"])), Some("u-1".to_string()));
    }

    #[test]
    fn test_elect_always_picks_a_member() {
        let pool = members(&["u-1", "u-2", "u-3"]);
        for _ in 0..50 {
            let host = elect(&pool).unwrap();
            assert!(pool.contains_key(&host));
        }
    }
}
