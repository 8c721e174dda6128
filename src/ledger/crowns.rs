//! Crown bookkeeping.
//!
//! Each player distributes a fixed pool of crowns across the four Ages.
//! Advancing pulls a crown forward from the nearest earlier Age holding
//! one; retreating pushes a crown back one Age. Both moves conserve the
//! pool and are no-ops when no legal source exists.

use serde::{Deserialize, Serialize};

use crate::core::{Age, PlayerId, PlayerMap};
use crate::core::player::Player;

/// Crowns per Age for one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreTrack([u8; 4]);

impl ScoreTrack {
    #[must_use]
    pub const fn new(crowns: [u8; 4]) -> Self {
        Self(crowns)
    }

    /// A track with the whole pool sitting in Age I.
    #[must_use]
    pub const fn with_pool(pool: u8) -> Self {
        Self([pool, 0, 0, 0])
    }

    #[must_use]
    pub fn crowns(&self, age: Age) -> u8 {
        self.0[age.index()]
    }

    #[must_use]
    pub fn as_array(&self) -> [u8; 4] {
        self.0
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.iter().map(|&c| u32::from(c)).sum()
    }

    /// Move one crown into `age` from the nearest earlier Age holding one.
    ///
    /// Returns the Age the crown came from, or `None` if nothing moved.
    pub fn advance(&mut self, age: Age) -> Option<Age> {
        let mut source = age.previous();
        while let Some(candidate) = source {
            if self.0[candidate.index()] > 0 {
                self.0[candidate.index()] -= 1;
                self.0[age.index()] += 1;
                return Some(candidate);
            }
            source = candidate.previous();
        }
        None
    }

    /// Move one crown out of `age` into the previous Age.
    ///
    /// Returns the Age the crown moved to, or `None` if nothing moved.
    pub fn retreat(&mut self, age: Age) -> Option<Age> {
        let target = age.previous()?;
        if self.0[age.index()] == 0 {
            return None;
        }
        self.0[age.index()] -= 1;
        self.0[target.index()] += 1;
        Some(target)
    }
}

impl From<[u8; 4]> for ScoreTrack {
    fn from(crowns: [u8; 4]) -> Self {
        Self(crowns)
    }
}

/// Read-side crown queries across all players.
pub struct CrownLedger;

impl CrownLedger {
    /// Players ruling `age`: those holding the maximum crown count there.
    ///
    /// Ties produce several rulers. Nobody rules an Age with no crowns.
    #[must_use]
    pub fn rulers(players: &PlayerMap<Player>, age: Age) -> Vec<PlayerId> {
        let best = players
            .iter()
            .map(|(_, p)| p.score_track.crowns(age))
            .max()
            .unwrap_or(0);
        if best == 0 {
            return Vec::new();
        }
        players
            .iter()
            .filter(|(_, p)| p.score_track.crowns(age) == best)
            .map(|(id, _)| id)
            .collect()
    }

    /// Whether `player` rules `age`; with `sole`, only an untied ruler counts.
    #[must_use]
    pub fn rules(players: &PlayerMap<Player>, player: PlayerId, age: Age, sole: bool) -> bool {
        let rulers = Self::rulers(players, age);
        rulers.contains(&player) && (!sole || rulers.len() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(tracks: &[[u8; 4]]) -> PlayerMap<Player> {
        PlayerMap::from_vec(
            tracks
                .iter()
                .enumerate()
                .map(|(i, t)| Player::new(PlayerId::new(i as u8), ScoreTrack::new(*t)))
                .collect(),
        )
    }

    #[test]
    fn test_advance_pulls_from_nearest_earlier_age() {
        let mut track = ScoreTrack::new([9, 1, 0, 0]);
        assert_eq!(track.advance(Age::III), Some(Age::II));
        assert_eq!(track.as_array(), [9, 0, 1, 0]);

        assert_eq!(track.advance(Age::III), Some(Age::I));
        assert_eq!(track.as_array(), [8, 0, 2, 0]);
        assert_eq!(track.total(), 10);
    }

    #[test]
    fn test_advance_into_age_one_is_noop() {
        let mut track = ScoreTrack::new([9, 1, 0, 0]);
        assert_eq!(track.advance(Age::I), None);
        assert_eq!(track.as_array(), [9, 1, 0, 0]);
    }

    #[test]
    fn test_advance_without_source_is_noop() {
        let mut track = ScoreTrack::new([0, 0, 0, 10]);
        assert_eq!(track.advance(Age::II), None);
        assert_eq!(track.as_array(), [0, 0, 0, 10]);
    }

    #[test]
    fn test_retreat() {
        let mut track = ScoreTrack::new([8, 2, 0, 0]);
        assert_eq!(track.retreat(Age::II), Some(Age::I));
        assert_eq!(track.as_array(), [9, 1, 0, 0]);

        assert_eq!(track.retreat(Age::IV), None);
        assert_eq!(track.retreat(Age::I), None);
        assert_eq!(track.total(), 10);
    }

    #[test]
    fn test_rulers_with_ties() {
        let map = players(&[[8, 2, 0, 0], [7, 2, 1, 0], [10, 0, 0, 0]]);

        assert_eq!(CrownLedger::rulers(&map, Age::I), vec![PlayerId::new(2)]);
        assert_eq!(
            CrownLedger::rulers(&map, Age::II),
            vec![PlayerId::new(0), PlayerId::new(1)]
        );
        assert!(CrownLedger::rulers(&map, Age::IV).is_empty());

        assert!(CrownLedger::rules(&map, PlayerId::new(0), Age::II, false));
        assert!(!CrownLedger::rules(&map, PlayerId::new(0), Age::II, true));
        assert!(CrownLedger::rules(&map, PlayerId::new(1), Age::III, true));
    }
}
