//! Player identification, per-player storage, and the player record.
//!
//! ## PlayerId
//!
//! Type-safe player identifier supporting 1-255 players.
//!
//! ## PlayerMap
//!
//! Per-player data storage backed by `Vec` for O(1) access.
//!
//! ## Player
//!
//! Everything the rules track for one seat: hand, coins, crowns, the
//! traveller's slot, perpetuals, bases and HQ. Collections are `im`
//! persistent structures so a whole game can be snapshotted cheaply.

use im::{OrdMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::board::Slot;
use crate::cards::CardId;
use crate::ledger::ScoreTrack;
use crate::triggers::TriggerCategory;

/// Player identifier supporting 1-255 players.
///
/// Player indices are 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a game with `player_count` players.
    ///
    /// ```
    /// use temporum_engine::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(3).collect();
    /// assert_eq!(players, vec![PlayerId::new(0), PlayerId::new(1), PlayerId::new(2)]);
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Build from already-constructed values, one per player in seat order.
    pub fn from_vec(data: Vec<T>) -> Self {
        assert!(!data.is_empty(), "Must have at least 1 player");
        assert!(data.len() <= 255, "At most 255 players supported");
        Self { data }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Whether `player` has a seat in this map.
    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        player.index() < self.data.len()
    }

    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

/// One seat's game state.
///
/// Fields are crate-private: only the resolver and turn engine mutate a
/// player. Drivers read through the accessors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) hand: Vector<CardId>,
    pub(crate) coins: u32,
    pub(crate) score_track: ScoreTrack,
    pub(crate) zone: Slot,
    pub(crate) perpetuals: OrdMap<TriggerCategory, Vector<CardId>>,
    pub(crate) bases: OrdSet<Slot>,
    pub(crate) hq: Option<Slot>,
}

impl Player {
    pub(crate) fn new(id: PlayerId, score_track: ScoreTrack) -> Self {
        Self {
            id,
            hand: Vector::new(),
            coins: 0,
            score_track,
            zone: Slot(0),
            perpetuals: OrdMap::new(),
            bases: OrdSet::new(),
            hq: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Hand in player-visible order.
    #[must_use]
    pub fn hand(&self) -> &Vector<CardId> {
        &self.hand
    }

    #[must_use]
    pub fn coins(&self) -> u32 {
        self.coins
    }

    #[must_use]
    pub fn score_track(&self) -> &ScoreTrack {
        &self.score_track
    }

    /// Slot the player's traveller occupies.
    #[must_use]
    pub fn zone(&self) -> Slot {
        self.zone
    }

    #[must_use]
    pub fn bases(&self) -> &OrdSet<Slot> {
        &self.bases
    }

    #[must_use]
    pub fn hq(&self) -> Option<Slot> {
        self.hq
    }

    /// Perpetuals registered under `category`, in resolution order.
    #[must_use]
    pub fn perpetuals_for(&self, category: TriggerCategory) -> Vector<CardId> {
        self.perpetuals.get(&category).cloned().unwrap_or_default()
    }

    /// Every perpetual the player holds, grouped by category in firing order.
    pub fn perpetuals(&self) -> impl Iterator<Item = (TriggerCategory, CardId)> + '_ {
        self.perpetuals
            .iter()
            .flat_map(|(category, cards)| cards.iter().map(move |card| (*category, *card)))
    }

    /// How many copies of `card` the player holds as perpetuals (any category).
    #[must_use]
    pub fn perpetual_count(&self, card: CardId) -> usize {
        self.perpetuals().filter(|(_, c)| *c == card).count()
    }

    /// Total number of perpetual cards held.
    #[must_use]
    pub fn perpetual_total(&self) -> usize {
        self.perpetuals.values().map(Vector::len).sum()
    }

    pub(crate) fn add_perpetual(&mut self, category: TriggerCategory, card: CardId) {
        self.perpetuals.entry(category).or_default().push_back(card);
    }

    /// Remove the first matching perpetual. Returns the category it was under.
    pub(crate) fn remove_perpetual(
        &mut self,
        card: CardId,
        category: Option<TriggerCategory>,
    ) -> Option<TriggerCategory> {
        let found = self
            .perpetuals
            .iter()
            .filter(|(cat, _)| category.is_none_or(|wanted| wanted == **cat))
            .find_map(|(cat, cards)| cards.index_of(&card).map(|pos| (*cat, pos)))?;

        let (cat, pos) = found;
        if let Some(cards) = self.perpetuals.get_mut(&cat) {
            cards.remove(pos);
            if cards.is_empty() {
                self.perpetuals.remove(&cat);
            }
        }
        Some(cat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(PlayerId::new(0), ScoreTrack::new([10, 0, 0, 0]))
    }

    #[test]
    fn test_player_id_basics() {
        let p1 = PlayerId::new(1);
        assert_eq!(p1.index(), 1);
        assert_eq!(format!("{}", p1), "Player 1");
    }

    #[test]
    fn test_player_map_access() {
        let mut map: PlayerMap<u32> = PlayerMap::from_vec(vec![0, 10, 20]);
        assert_eq!(map[PlayerId::new(2)], 20);

        map[PlayerId::new(1)] = 7;
        assert_eq!(map[PlayerId::new(1)], 7);
        assert!(map.contains(PlayerId::new(2)));
        assert!(!map.contains(PlayerId::new(3)));
        assert_eq!(map.iter().map(|(id, _)| id).last(), Some(PlayerId::new(2)));
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_player_map_zero_players() {
        let _: PlayerMap<u32> = PlayerMap::from_vec(Vec::new());
    }

    #[test]
    fn test_perpetual_insertion_order() {
        let mut p = player();
        p.add_perpetual(TriggerCategory::PostPlay, CardId::new(3));
        p.add_perpetual(TriggerCategory::PostPlay, CardId::new(1));
        p.add_perpetual(TriggerCategory::Play, CardId::new(3));

        let post: Vec<_> = p.perpetuals_for(TriggerCategory::PostPlay).into_iter().collect();
        assert_eq!(post, vec![CardId::new(3), CardId::new(1)]);

        // Grouped by category in firing order.
        let all: Vec<_> = p.perpetuals().collect();
        assert_eq!(all[0], (TriggerCategory::Play, CardId::new(3)));
        assert_eq!(p.perpetual_count(CardId::new(3)), 2);
        assert_eq!(p.perpetual_total(), 3);
    }

    #[test]
    fn test_remove_perpetual() {
        let mut p = player();
        p.add_perpetual(TriggerCategory::TurnEnd, CardId::new(5));

        assert_eq!(p.remove_perpetual(CardId::new(5), Some(TriggerCategory::Play)), None);
        assert_eq!(
            p.remove_perpetual(CardId::new(5), None),
            Some(TriggerCategory::TurnEnd)
        );
        assert_eq!(p.perpetual_total(), 0);
        assert!(p.perpetuals_for(TriggerCategory::TurnEnd).is_empty());
    }
}
