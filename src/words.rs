//! The spectrum word-pair catalog and sampling without replacement.
//!
//! Every room gets its own copy of the catalog with per-entry `used` marks,
//! so drawing in one room never affects another. Marks only move from unused
//! to used between resets.

use crate::types::PairWord;
use rand::seq::IteratorRandom;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("every word pair has been used; reset the pool to draw again")]
pub struct Exhausted;

/// The built-in spectrum prompts. Each entry is a pair of opposing concepts
/// the clue giver bridges with their clue.
const CATALOG: &[(&str, &str)] = &[
    ("Hot", "Cold"),
    ("Underrated", "Overrated"),
    ("Cheap", "Expensive"),
    ("Scary", "Cute"),
    ("Useless", "Useful"),
    ("Round", "Pointy"),
    ("Quiet", "Loud"),
    ("Ancient", "Modern"),
    ("Healthy", "Unhealthy"),
    ("Ordinary", "Extraordinary"),
    ("Guilty pleasure", "Actually good"),
    ("Smells bad", "Smells good"),
    ("Easy to learn", "Hard to learn"),
    ("Dry", "Wet"),
    ("Fragile", "Durable"),
    ("Casual", "Formal"),
    ("Introvert activity", "Extrovert activity"),
    ("Waste of time", "Good use of time"),
    ("Villain", "Hero"),
    ("Boring topic", "Fascinating topic"),
    ("Bad habit", "Good habit"),
    ("Soft", "Hard"),
    ("Forgettable", "Unforgettable"),
    ("Worst day of the year", "Best day of the year"),
];

/// A fresh full-pool copy with every entry unused. Seeded into each room at
/// creation.
pub fn fresh_pool() -> Vec<PairWord> {
    CATALOG
        .iter()
        .map(|(a, b)| PairWord {
            words: (a.to_string(), b.to_string()),
            used: false,
        })
        .collect()
}

/// Pick one unused entry uniformly at random, mark it used, and return a
/// clone of it. Fails without touching the pool when nothing is left.
pub fn sample(pool: &mut [PairWord]) -> Result<PairWord, Exhausted> {
    let mut rng = rand::rng();
    let picked = pool
        .iter_mut()
        .filter(|entry| !entry.used)
        .choose(&mut rng)
        .ok_or(Exhausted)?;
    picked.used = true;
    Ok(picked.clone())
}

/// Clear every `used` mark, making the whole catalog drawable again.
pub fn reset(pool: &mut [PairWord]) {
    for entry in pool.iter_mut() {
        entry.used = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn small_pool(n: usize) -> Vec<PairWord> {
        (0..n)
            .map(|i| PairWord {
                words: (format!("left{}", i), format!("right{}", i)),
                used: false,
            })
            .collect()
    }

    #[test]
    fn test_fresh_pool_all_unused() {
        let pool = fresh_pool();
        assert!(!pool.is_empty());
        assert!(pool.iter().all(|entry| !entry.used));
    }

    #[test]
    fn test_sample_marks_used() {
        let mut pool = small_pool(3);
        let drawn = sample(&mut pool).unwrap();
        assert!(drawn.used);
        assert_eq!(pool.iter().filter(|e| e.used).count(), 1);
    }

    #[test]
    fn test_sample_until_exhaustion_visits_every_entry_once() {
        let mut pool = small_pool(5);
        let mut seen = HashSet::new();
        for _ in 0..5 {
            let drawn = sample(&mut pool).unwrap();
            assert!(seen.insert(drawn.words.clone()), "entry drawn twice");
        }
        assert_eq!(sample(&mut pool), Err(Exhausted));
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_exhausted_draw_leaves_pool_untouched() {
        let mut pool = small_pool(1);
        sample(&mut pool).unwrap();
        let before = pool.clone();
        assert_eq!(sample(&mut pool), Err(Exhausted));
        assert_eq!(pool, before);
    }

    #[test]
    fn test_reset_allows_redraw() {
        let mut pool = small_pool(2);
        sample(&mut pool).unwrap();
        sample(&mut pool).unwrap();
        assert_eq!(sample(&mut pool), Err(Exhausted));

        reset(&mut pool);
        assert!(pool.iter().all(|e| !e.used));
        assert!(sample(&mut pool).is_ok());
    }
}
