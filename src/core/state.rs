//! Game state: the single store every engine component reads and writes.
//!
//! `GameState` holds players, the shared piles, the zone table, the open
//! prompt, the resolution stack and the log. Every collection is an `im`
//! persistent structure, so cloning the whole state is cheap; the turn
//! engine clones it before each command and restores the clone if the
//! command fails.
//!
//! Drivers read through the accessors. Mutation is crate-private and
//! happens only in the resolver, the choice broker and the turn engine.

use std::sync::Arc;

use im::Vector;
use serde::{Deserialize, Serialize};

use super::action::CommandRecord;
use super::board::Slot;
use super::config::{GameSetup, RulesConfig};
use super::player::{Player, PlayerId, PlayerMap};
use super::rng::ShuffleProvider;
use crate::cards::CardId;
use crate::catalog::Catalog;
use crate::choice::PendingChoice;
use crate::error::{EngineError, Result};
use crate::ledger::ScoreTrack;
use crate::log::{GameLog, LogCategory, Verbosity};
use crate::stack::ResolutionStack;
use crate::zones::{ZoneDefinition, ZoneTable};

/// Turn engine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The active player must visit a zone.
    AwaitingVisit,
    /// The visited zone's script (and visit perpetuals) are resolving.
    ResolvingZoneEntry,
    /// The active player may play, score or end the turn.
    AwaitingAction,
    /// A play or score is resolving.
    ResolvingAction,
    /// Turn-end perpetuals are resolving.
    ResolvingTurnEnd,
    /// Stopped by the driver; every command is rejected.
    Finished,
}

/// Complete game state.
#[derive(Clone, Debug)]
pub struct GameState {
    pub(crate) players: PlayerMap<Player>,
    pub(crate) turn_order: Vec<PlayerId>,
    /// Index into `turn_order`.
    pub(crate) active: usize,
    pub(crate) turn_number: u32,
    pub(crate) phase: Phase,
    pub(crate) actions_remaining: u32,
    pub(crate) extra_turns: u32,
    /// Draw pile, front is the top.
    pub(crate) deck: Vector<CardId>,
    pub(crate) discard: Vector<CardId>,
    /// Cards being played or scored, until claimed or settled.
    pub(crate) in_play: Vector<CardId>,
    pub(crate) zones: ZoneTable,
    pub(crate) pending: Option<PendingChoice>,
    pub(crate) stack: ResolutionStack,
    pub(crate) rng: Box<dyn ShuffleProvider>,
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) rules: RulesConfig,
    pub(crate) log: GameLog,
    pub(crate) history: Vector<CommandRecord>,
}

impl GameState {
    /// Build and validate the opening state.
    ///
    /// Fails with [`EngineError::Configuration`] when the setup names
    /// unknown cards or zones, binds a zone outside its Age, uses a slot
    /// outside the board, or gives a score track that does not sum to the
    /// crown pool.
    pub fn from_setup(
        catalog: Arc<Catalog>,
        setup: GameSetup,
        rng: Box<dyn ShuffleProvider>,
    ) -> Result<Self> {
        let GameSetup {
            players: seats,
            zones: overrides,
            deck,
            discard,
            hourglass,
            rules,
        } = setup;

        if seats.is_empty() || seats.len() > 255 {
            return Err(EngineError::config(format!(
                "a game needs 1 to 255 players, got {}",
                seats.len()
            )));
        }

        let check_slot = |slot: Slot, what: &str| {
            if slot.is_valid() {
                Ok(())
            } else {
                Err(EngineError::config(format!("{} uses {} outside the board", what, slot)))
            }
        };
        let check_cards = |cards: &[CardId], what: &str| match cards
            .iter()
            .find(|c| !catalog.cards().contains(**c))
        {
            Some(card) => Err(EngineError::config(format!("{} contains unknown {}", what, card))),
            None => Ok(()),
        };

        let mut bindings = catalog.default_bindings();
        for (slot, id) in overrides {
            check_slot(slot, "zone binding")?;
            let def = catalog
                .zone(id)
                .ok_or_else(|| EngineError::config(format!("unknown zone definition {}", id)))?;
            if def.age != slot.age() {
                return Err(EngineError::config(format!(
                    "{} ({}) cannot be bound to {} ({})",
                    def.name,
                    def.age,
                    slot,
                    slot.age()
                )));
            }
            bindings[slot.index()] = id;
        }
        let mut zones = ZoneTable::new(bindings);
        for (slot, value) in hourglass {
            check_slot(slot, "hourglass override")?;
            zones.set_hourglass(slot, value);
        }

        let mut rng = rng;
        let deck = match deck {
            Some(cards) => {
                check_cards(&cards, "deck")?;
                cards.into_iter().collect()
            }
            None => {
                let mut cards = catalog.default_deck().to_vec();
                rng.shuffle(&mut cards);
                cards.into_iter().collect()
            }
        };
        check_cards(&discard, "discard pile")?;

        let mut players = Vec::with_capacity(seats.len());
        let mut to_deal = Vec::new();
        for (seat, config) in seats.into_iter().enumerate() {
            let id = PlayerId::new(seat as u8);
            let track = config
                .score_track
                .unwrap_or([rules.crown_pool, 0, 0, 0]);
            let track = ScoreTrack::new(track);
            if track.total() != u32::from(rules.crown_pool) {
                return Err(EngineError::config(format!(
                    "{} score track {:?} does not sum to {}",
                    id,
                    track.as_array(),
                    rules.crown_pool
                )));
            }

            let mut player = Player::new(id, track);
            player.coins = config.coins.unwrap_or(rules.starting_coins);
            if let Some(zone) = config.zone {
                check_slot(zone, "starting zone")?;
                player.zone = zone;
            }
            for slot in config.bases {
                check_slot(slot, "base")?;
                player.bases.insert(slot);
            }
            if let Some(hq) = config.hq {
                check_slot(hq, "HQ")?;
                player.hq = Some(hq);
            }
            for (category, card) in config.perpetuals {
                check_cards(&[card], "perpetuals")?;
                player.add_perpetual(category, card);
            }
            match config.hand {
                Some(hand) => {
                    check_cards(&hand, "hand")?;
                    player.hand = hand.into_iter().collect();
                }
                None => to_deal.push(id),
            }
            players.push(player);
        }

        let turn_order = players.iter().map(|p| p.id).collect();
        let mut state = Self {
            players: PlayerMap::from_vec(players),
            turn_order,
            active: 0,
            turn_number: 1,
            phase: Phase::AwaitingVisit,
            actions_remaining: rules.actions_per_turn,
            extra_turns: 0,
            deck,
            discard: discard.into_iter().collect(),
            in_play: Vector::new(),
            zones,
            pending: None,
            stack: ResolutionStack::new(),
            rng,
            catalog,
            log: GameLog::new(rules.verbosity),
            rules,
            history: Vector::new(),
        };

        let hand_size = state.rules.starting_hand as u32;
        for id in to_deal {
            state.draw(id, hand_size);
        }

        let count = state.players.player_count();
        state.note(Verbosity::Minimal, LogCategory::Turn, None, || {
            format!("Game started with {} players", count)
        });
        Ok(state)
    }

    // === Reads ===

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    pub fn player(&self, player: PlayerId) -> Result<&Player> {
        if self.players.contains(player) {
            Ok(&self.players[player])
        } else {
            Err(EngineError::illegal(format!("no such player: {}", player)))
        }
    }

    #[must_use]
    pub fn players(&self) -> &PlayerMap<Player> {
        &self.players
    }

    #[must_use]
    pub fn turn_order(&self) -> &[PlayerId] {
        &self.turn_order
    }

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.turn_order[self.active]
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    #[must_use]
    pub fn actions_remaining(&self) -> u32 {
        self.actions_remaining
    }

    #[must_use]
    pub fn extra_turns(&self) -> u32 {
        self.extra_turns
    }

    #[must_use]
    pub fn deck(&self) -> &Vector<CardId> {
        &self.deck
    }

    #[must_use]
    pub fn discard_pile(&self) -> &Vector<CardId> {
        &self.discard
    }

    #[must_use]
    pub fn in_play(&self) -> &Vector<CardId> {
        &self.in_play
    }

    #[must_use]
    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    /// Definition currently bound to `slot`.
    #[must_use]
    pub fn zone_definition(&self, slot: Slot) -> Option<&ZoneDefinition> {
        if !slot.is_valid() {
            return None;
        }
        self.catalog.zone(self.zones.binding(slot))
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PendingChoice> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn stack(&self) -> &ResolutionStack {
        &self.stack
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    #[must_use]
    pub fn log(&self) -> &GameLog {
        &self.log
    }

    #[must_use]
    pub fn history(&self) -> &Vector<CommandRecord> {
        &self.history
    }

    /// Every card in the game: deck, discard, in play, hands and perpetuals.
    #[must_use]
    pub fn card_total(&self) -> usize {
        let held: usize = self
            .players
            .iter()
            .map(|(_, p)| p.hand.len() + p.perpetual_total())
            .sum();
        self.deck.len() + self.discard.len() + self.in_play.len() + held
    }

    /// Display name of a card, falling back to its id.
    #[must_use]
    pub fn card_name(&self, card: CardId) -> String {
        self.catalog
            .card(card)
            .map_or_else(|| card.to_string(), |def| def.name.clone())
    }

    /// The player after `player` in turn order.
    #[must_use]
    pub fn next_player(&self, player: PlayerId) -> PlayerId {
        let pos = self
            .turn_order
            .iter()
            .position(|p| *p == player)
            .unwrap_or(0);
        self.turn_order[(pos + 1) % self.turn_order.len()]
    }

    /// Turn order starting at `first`.
    #[must_use]
    pub fn order_from(&self, first: PlayerId) -> Vec<PlayerId> {
        let pos = self
            .turn_order
            .iter()
            .position(|p| *p == first)
            .unwrap_or(0);
        let n = self.turn_order.len();
        (0..n).map(|i| self.turn_order[(pos + i) % n]).collect()
    }

    // === Mutation ===

    pub(crate) fn player_mut(&mut self, player: PlayerId) -> &mut Player {
        &mut self.players[player]
    }

    pub(crate) fn note(
        &mut self,
        level: Verbosity,
        category: LogCategory,
        player: Option<PlayerId>,
        message: impl FnOnce() -> String,
    ) {
        let turn = self.turn_number;
        self.log.record(level, category, turn, player, message);
    }

    /// Draw up to `count` cards, reshuffling the discard pile into the
    /// deck whenever the deck runs out. Returns how many were drawn.
    pub(crate) fn draw(&mut self, player: PlayerId, count: u32) -> u32 {
        let mut drawn = 0;
        for _ in 0..count {
            if self.deck.is_empty() && !self.reshuffle() {
                break;
            }
            let Some(card) = self.deck.pop_front() else {
                break;
            };
            self.players[player].hand.push_back(card);
            drawn += 1;
        }
        drawn
    }

    fn reshuffle(&mut self) -> bool {
        if self.discard.is_empty() {
            return false;
        }
        let mut cards: Vec<CardId> = std::mem::take(&mut self.discard).into_iter().collect();
        self.rng.shuffle(&mut cards);
        let count = cards.len();
        self.deck = cards.into_iter().collect();
        self.note(Verbosity::Verbose, LogCategory::Effect, None, || {
            format!("Reshuffled {} discarded cards into the deck", count)
        });
        true
    }

    /// Remove the hand card at `index`.
    pub(crate) fn take_from_hand(&mut self, player: PlayerId, index: usize) -> Result<CardId> {
        let hand = &mut self.players[player].hand;
        if index >= hand.len() {
            return Err(EngineError::illegal(format!(
                "{} has no card at index {} (hand size {})",
                player,
                index,
                hand.len()
            )));
        }
        Ok(hand.remove(index))
    }

    /// Move the given hand cards to the discard pile, lowest index first.
    /// Indices must be distinct and in range.
    pub(crate) fn discard_from_hand(&mut self, player: PlayerId, indices: &[usize]) -> Result<u32> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let hand_size = self.players[player].hand.len();
        if sorted.len() != indices.len() || sorted.last().is_some_and(|i| *i >= hand_size) {
            return Err(EngineError::script(format!(
                "bad discard indices {:?} for hand size {}",
                indices, hand_size
            )));
        }

        let hand = &mut self.players[player].hand;
        let mut removed: Vec<CardId> = sorted.iter().rev().map(|i| hand.remove(*i)).collect();
        removed.reverse();
        let count = removed.len() as u32;
        self.discard.extend(removed);
        Ok(count)
    }

    /// Find a bound hand card: at its remembered index if still there,
    /// otherwise its first copy.
    pub(crate) fn locate_in_hand(&self, player: PlayerId, index: usize, card: CardId) -> Option<usize> {
        let hand = &self.players[player].hand;
        if hand.get(index) == Some(&card) {
            Some(index)
        } else {
            hand.index_of(&card)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::standard::{ARTIST, COLD_WAR, GIZMO, TRADE_GOODS};
    use crate::core::config::PlayerSetup;
    use crate::core::rng::{GameRng, IdentityShuffle};
    use crate::triggers::TriggerCategory;

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::standard().unwrap())
    }

    fn state(setup: GameSetup) -> GameState {
        GameState::from_setup(catalog(), setup, Box::new(IdentityShuffle)).unwrap()
    }

    #[test]
    fn test_default_setup_deals_hands() {
        let s = GameState::from_setup(catalog(), GameSetup::new(3), Box::new(GameRng::new(9))).unwrap();
        assert_eq!(s.player_count(), 3);
        for (_, p) in s.players().iter() {
            assert_eq!(p.hand().len(), 3);
            assert_eq!(p.score_track().as_array(), [10, 0, 0, 0]);
            assert_eq!(p.zone(), Slot(0));
        }
        assert_eq!(s.card_total(), 30);
        assert_eq!(s.phase(), Phase::AwaitingVisit);
        assert_eq!(s.actions_remaining(), 2);
    }

    #[test]
    fn test_setup_validation() {
        let bad_track = GameSetup::new(1).with_player(0, PlayerSetup::new().with_score_track([5, 0, 0, 0]));
        assert!(matches!(
            GameState::from_setup(catalog(), bad_track, Box::new(IdentityShuffle)),
            Err(EngineError::Configuration(_))
        ));

        let bad_card = GameSetup::new(1).with_deck([CardId::new(500)]);
        assert!(GameState::from_setup(catalog(), bad_card, Box::new(IdentityShuffle)).is_err());

        let bad_age = GameSetup::new(1).bind(Slot(0), COLD_WAR);
        assert!(GameState::from_setup(catalog(), bad_age, Box::new(IdentityShuffle)).is_err());

        let bad_slot = GameSetup::new(1).with_player(0, PlayerSetup::new().at(Slot(10)));
        assert!(GameState::from_setup(catalog(), bad_slot, Box::new(IdentityShuffle)).is_err());

        assert!(GameState::from_setup(catalog(), GameSetup::new(0), Box::new(IdentityShuffle)).is_err());
    }

    #[test]
    fn test_draw_reshuffles_discard() {
        let mut s = state(
            GameSetup::new(1)
                .with_player(0, PlayerSetup::new().with_hand([]))
                .with_deck([ARTIST])
                .with_discard([GIZMO, TRADE_GOODS]),
        );
        let p = PlayerId::new(0);
        assert_eq!(s.draw(p, 5), 3);
        assert_eq!(s.player(p).unwrap().hand().len(), 3);
        assert!(s.deck().is_empty());
        assert!(s.discard_pile().is_empty());
        assert_eq!(s.draw(p, 1), 0);
    }

    #[test]
    fn test_discard_from_hand_keeps_order() {
        let mut s = state(
            GameSetup::new(1)
                .with_player(0, PlayerSetup::new().with_hand([ARTIST, GIZMO, TRADE_GOODS]))
                .with_deck([]),
        );
        let p = PlayerId::new(0);
        assert_eq!(s.discard_from_hand(p, &[2, 0]).unwrap(), 2);
        assert_eq!(s.discard_pile().iter().copied().collect::<Vec<_>>(), vec![ARTIST, TRADE_GOODS]);
        assert_eq!(s.player(p).unwrap().hand()[0], GIZMO);
        assert!(s.discard_from_hand(p, &[1]).is_err());
        assert!(s.take_from_hand(p, 3).is_err());
    }

    #[test]
    fn test_perpetuals_from_setup_count_as_cards() {
        let s = state(
            GameSetup::new(2)
                .with_player(
                    0,
                    PlayerSetup::new()
                        .with_hand([ARTIST])
                        .with_perpetual(TriggerCategory::PostPlay, GIZMO),
                )
                .with_player(1, PlayerSetup::new().with_hand([]))
                .with_deck([TRADE_GOODS, TRADE_GOODS]),
        );
        assert_eq!(s.card_total(), 4);
        assert_eq!(s.next_player(PlayerId::new(1)), PlayerId::new(0));
        assert_eq!(s.order_from(PlayerId::new(1)), vec![PlayerId::new(1), PlayerId::new(0)]);
    }
}
