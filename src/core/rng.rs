//! Shuffle providers.
//!
//! Randomness enters the engine only when the draw pile is (re)built, and
//! always through a [`ShuffleProvider`]. Games inject one at setup:
//!
//! - [`GameRng`]: seeded ChaCha8, deterministic for a given seed
//! - [`IdentityShuffle`]: leaves order untouched, for scripted fixtures
//!
//! ```
//! use temporum_engine::core::{GameRng, ShuffleProvider};
//! use temporum_engine::cards::CardId;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! let mut left: Vec<_> = (0..10).map(CardId::new).collect();
//! let mut right = left.clone();
//! a.shuffle(&mut left);
//! b.shuffle(&mut right);
//! assert_eq!(left, right);
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::cards::CardId;

/// Source of deck shuffles.
///
/// Providers are cloned alongside the game state when a command is
/// snapshotted, so a rolled-back command also rolls back the RNG.
pub trait ShuffleProvider: std::fmt::Debug + Send {
    /// Shuffle `cards` in place.
    fn shuffle(&mut self, cards: &mut Vec<CardId>);

    /// Clone into a new box.
    fn box_clone(&self) -> Box<dyn ShuffleProvider>;
}

impl Clone for Box<dyn ShuffleProvider> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Deterministic seeded RNG.
///
/// Uses ChaCha8 for speed.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl ShuffleProvider for GameRng {
    fn shuffle(&mut self, cards: &mut Vec<CardId>) {
        use rand::seq::SliceRandom;
        cards.shuffle(&mut self.inner);
    }

    fn box_clone(&self) -> Box<dyn ShuffleProvider> {
        Box::new(self.clone())
    }
}

/// A provider that never reorders anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityShuffle;

impl ShuffleProvider for IdentityShuffle {
    fn shuffle(&mut self, _cards: &mut Vec<CardId>) {}

    fn box_clone(&self) -> Box<dyn ShuffleProvider> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(n: u32) -> Vec<CardId> {
        (0..n).map(CardId::new).collect()
    }

    #[test]
    fn test_seeded_shuffle_is_deterministic() {
        let mut rng1 = GameRng::new(7);
        let mut rng2 = GameRng::new(7);
        let mut a = cards(20);
        let mut b = cards(20);
        rng1.shuffle(&mut a);
        rng2.shuffle(&mut b);
        assert_eq!(a, b);
        assert_ne!(a, cards(20));

        a.sort();
        assert_eq!(a, cards(20));
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = cards(20);
        let mut b = cards(20);
        GameRng::new(1).shuffle(&mut a);
        GameRng::new(2).shuffle(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_boxed_clone_keeps_position() {
        let mut original: Box<dyn ShuffleProvider> = Box::new(GameRng::new(3));
        let mut copy = original.clone();
        let mut a = cards(12);
        let mut b = cards(12);
        original.shuffle(&mut a);
        copy.shuffle(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_identity_shuffle() {
        let mut deck = cards(5);
        IdentityShuffle.shuffle(&mut deck);
        assert_eq!(deck, cards(5));
    }
}
