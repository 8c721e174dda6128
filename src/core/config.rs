//! Game configuration types.
//!
//! - `RulesConfig`: tunable rule constants (actions per turn, bonuses, limits)
//! - `PlayerSetup`: optional per-seat overrides
//! - `GameSetup`: everything needed to start a game
//!
//! Every field is optional with a documented default; the game state
//! validates the whole setup against the catalog before it starts.

use serde::{Deserialize, Serialize};

use super::board::Slot;
use crate::cards::CardId;
use crate::log::Verbosity;
use crate::triggers::TriggerCategory;
use crate::zones::ZoneDefId;

/// Rule constants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Plays/scores allowed per turn.
    pub actions_per_turn: u32,
    /// Paid to each base owner when a traveller moves into the slot.
    pub base_visit_bonus: u32,
    /// Paid to the HQ owner when a traveller moves into the slot.
    pub hq_visit_bonus: u32,
    /// Crowns on every score track.
    pub crown_pool: u8,
    /// Cards dealt to players without an explicit hand.
    pub starting_hand: usize,
    pub starting_coins: u32,
    /// How deep scripts may start other scripts (copies, replays, firings).
    pub max_chain_depth: usize,
    pub verbosity: Verbosity,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            actions_per_turn: 2,
            base_visit_bonus: 1,
            hq_visit_bonus: 2,
            crown_pool: 10,
            starting_hand: 3,
            starting_coins: 0,
            max_chain_depth: 32,
            verbosity: Verbosity::Normal,
        }
    }
}

impl RulesConfig {
    #[must_use]
    pub fn with_actions_per_turn(mut self, actions: u32) -> Self {
        self.actions_per_turn = actions;
        self
    }

    #[must_use]
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_starting_hand(mut self, cards: usize) -> Self {
        self.starting_hand = cards;
        self
    }
}

/// Per-seat overrides. Unset fields fall back to the rules defaults:
/// a dealt hand, `starting_coins`, all crowns in Age I, slot 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub hand: Option<Vec<CardId>>,
    pub coins: Option<u32>,
    pub score_track: Option<[u8; 4]>,
    pub perpetuals: Vec<(TriggerCategory, CardId)>,
    pub bases: Vec<Slot>,
    pub hq: Option<Slot>,
    pub zone: Option<Slot>,
}

impl PlayerSetup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_hand(mut self, hand: impl IntoIterator<Item = CardId>) -> Self {
        self.hand = Some(hand.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_coins(mut self, coins: u32) -> Self {
        self.coins = Some(coins);
        self
    }

    #[must_use]
    pub fn with_score_track(mut self, track: [u8; 4]) -> Self {
        self.score_track = Some(track);
        self
    }

    #[must_use]
    pub fn with_perpetual(mut self, category: TriggerCategory, card: CardId) -> Self {
        self.perpetuals.push((category, card));
        self
    }

    #[must_use]
    pub fn with_base(mut self, slot: Slot) -> Self {
        self.bases.push(slot);
        self
    }

    #[must_use]
    pub fn with_hq(mut self, slot: Slot) -> Self {
        self.hq = Some(slot);
        self
    }

    #[must_use]
    pub fn at(mut self, slot: Slot) -> Self {
        self.zone = Some(slot);
        self
    }
}

/// Complete game setup.
///
/// ## Example
///
/// ```
/// use temporum_engine::core::{GameSetup, PlayerSetup, Slot};
/// use temporum_engine::zones::ZoneDefId;
///
/// let setup = GameSetup::new(2)
///     .with_player(0, PlayerSetup::new().with_coins(3).at(Slot(5)))
///     .bind(Slot(0), ZoneDefId::new(10));
///
/// assert_eq!(setup.players.len(), 2);
/// assert_eq!(setup.players[0].coins, Some(3));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    /// One entry per seat, in turn order.
    pub players: Vec<PlayerSetup>,
    /// Slot binding overrides on top of the catalog defaults.
    pub zones: Vec<(Slot, ZoneDefId)>,
    /// Draw pile, index 0 on top. `None` shuffles the catalog's default deck.
    pub deck: Option<Vec<CardId>>,
    pub discard: Vec<CardId>,
    pub hourglass: Vec<(Slot, u8)>,
    pub rules: RulesConfig,
}

impl GameSetup {
    /// Setup with `player_count` default seats.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            players: vec![PlayerSetup::default(); player_count],
            ..Self::default()
        }
    }

    /// Replace the setup of seat `seat`, growing the seat list if needed.
    #[must_use]
    pub fn with_player(mut self, seat: usize, player: PlayerSetup) -> Self {
        if seat >= self.players.len() {
            self.players.resize(seat + 1, PlayerSetup::default());
        }
        self.players[seat] = player;
        self
    }

    #[must_use]
    pub fn bind(mut self, slot: Slot, zone: ZoneDefId) -> Self {
        self.zones.push((slot, zone));
        self
    }

    #[must_use]
    pub fn with_deck(mut self, deck: impl IntoIterator<Item = CardId>) -> Self {
        self.deck = Some(deck.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_discard(mut self, discard: impl IntoIterator<Item = CardId>) -> Self {
        self.discard = discard.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_hourglass(mut self, slot: Slot, value: u8) -> Self {
        self.hourglass.push((slot, value));
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_defaults() {
        let rules = RulesConfig::default();
        assert_eq!(rules.actions_per_turn, 2);
        assert_eq!(rules.base_visit_bonus, 1);
        assert_eq!(rules.hq_visit_bonus, 2);
        assert_eq!(rules.crown_pool, 10);
        assert_eq!(rules.starting_hand, 3);
        assert_eq!(rules.max_chain_depth, 32);
    }

    #[test]
    fn test_player_setup_builder() {
        let setup = PlayerSetup::new()
            .with_hand([CardId::new(1), CardId::new(2)])
            .with_score_track([9, 1, 0, 0])
            .with_perpetual(TriggerCategory::PostPlay, CardId::new(6))
            .with_base(Slot(1))
            .with_hq(Slot(4))
            .at(Slot(5));

        assert_eq!(setup.hand.as_ref().map(Vec::len), Some(2));
        assert_eq!(setup.perpetuals, vec![(TriggerCategory::PostPlay, CardId::new(6))]);
        assert_eq!(setup.zone, Some(Slot(5)));
        assert!(setup.coins.is_none());
    }

    #[test]
    fn test_game_setup_grows_seats() {
        let setup = GameSetup::new(1).with_player(2, PlayerSetup::new().with_coins(4));
        assert_eq!(setup.players.len(), 3);
        assert_eq!(setup.players[2].coins, Some(4));
        assert_eq!(setup.players[1], PlayerSetup::default());
    }

    #[test]
    fn test_setup_serialization() {
        let setup = GameSetup::new(2)
            .with_deck([CardId::new(1)])
            .with_hourglass(Slot(8), 2)
            .with_rules(RulesConfig::default().with_actions_per_turn(3));
        let json = serde_json::to_string(&setup).unwrap();
        let back: GameSetup = serde_json::from_str(&json).unwrap();
        assert_eq!(back, setup);
    }
}
