//! The turn engine.
//!
//! [`Game`] owns a [`GameState`] and moves it through the turn:
//!
//! ```text
//! AwaitingVisit -> ResolvingZoneEntry -> AwaitingAction <-> ResolvingAction
//!                                             |
//!                                             v
//!                              ResolvingTurnEnd -> AwaitingVisit (next)
//! ```
//!
//! Every command is transactional: the state is snapshotted first and
//! restored if anything fails, so a rejected command never leaves a trace.

use std::sync::Arc;

use im::Vector;

use super::engine::RulesEngine;
use crate::cards::CardId;
use crate::catalog::Catalog;
use crate::choice::{Answer, ChoiceBroker, ChoiceKind, ChoiceOptions, PendingChoice};
use crate::core::{
    Age, Command, CommandRecord, GameSetup, GameState, Phase, Player, PlayerId, ShuffleProvider, Slot,
};
use crate::effects::{EffectResolver, EffectSource, ResolutionContext};
use crate::error::{EngineError, Result};
use crate::ledger::{CrownLedger, Economy};
use crate::log::{GameLog, LogCategory, Verbosity};
use crate::stack::{Frame, ResolutionStatus, Task};
use crate::triggers::TriggerCategory;
use crate::zones::{RebindRecord, ZoneDefId};

/// A running game.
///
/// ## Example
///
/// ```
/// use temporum_engine::catalog::standard::{ARTIST, TRADE_GOODS};
/// use temporum_engine::core::{GameSetup, IdentityShuffle, PlayerId, PlayerSetup, Slot};
/// use temporum_engine::rules::Game;
///
/// let setup = GameSetup::new(2)
///     .with_player(0, PlayerSetup::new().with_hand([ARTIST]).at(Slot(5)))
///     .with_deck([TRADE_GOODS; 6]);
/// let mut game = Game::standard(setup, Box::new(IdentityShuffle)).unwrap();
///
/// game.visit_zone(Slot(6)).unwrap();
/// game.play_card(0).unwrap();
/// assert_eq!(game.coins(PlayerId::new(0)).unwrap(), 8);
/// ```
#[derive(Clone, Debug)]
pub struct Game {
    state: GameState,
}

impl Game {
    /// Set up a game against `catalog`.
    pub fn new(catalog: Arc<Catalog>, setup: GameSetup, rng: Box<dyn ShuffleProvider>) -> Result<Self> {
        Ok(Self {
            state: GameState::from_setup(catalog, setup, rng)?,
        })
    }

    /// Set up a game against the standard catalog.
    pub fn standard(setup: GameSetup, rng: Box<dyn ShuffleProvider>) -> Result<Self> {
        Self::new(Arc::new(Catalog::standard()?), setup, rng)
    }

    // === Commands ===

    /// Apply one command, rolling the state back if it fails.
    pub fn apply(&mut self, command: Command) -> Result<ResolutionStatus> {
        let snapshot = self.state.clone();
        let player = self
            .state
            .pending
            .as_ref()
            .map_or_else(|| self.state.active_player(), |choice| choice.player);
        let turn = self.state.turn_number;

        self.state.note(Verbosity::Normal, LogCategory::Command, Some(player), || {
            format!("{}: {}", player, command)
        });

        match self.dispatch(&command) {
            Ok(status) => {
                let sequence = self.state.history.len() as u32;
                self.state
                    .history
                    .push_back(CommandRecord::new(player, command, turn, sequence));
                Ok(status)
            }
            Err(err) => {
                self.state = snapshot;
                Err(err)
            }
        }
    }

    fn dispatch(&mut self, command: &Command) -> Result<ResolutionStatus> {
        if self.state.phase == Phase::Finished {
            return Err(EngineError::illegal("the game has finished"));
        }

        if let Some(choice) = &self.state.pending {
            let answer = ChoiceBroker::translate(choice, command)?;
            ChoiceBroker::submit(&mut self.state, answer)?;
            return self.drive();
        }

        match command {
            Command::VisitZone(slot) => self.visit(*slot),
            Command::PlayCard(index) => self.play(*index),
            Command::ScoreCard(index) => self.score(*index),
            Command::EndTurn => self.end_turn_now(),
            other => Err(EngineError::illegal(format!(
                "'{}' answers a choice, but none is open",
                other
            ))),
        }
    }

    fn expect_phase(&self, phase: Phase, what: &str) -> Result<()> {
        if self.state.phase == phase {
            Ok(())
        } else {
            Err(EngineError::illegal(format!(
                "cannot {} during {:?}",
                what, self.state.phase
            )))
        }
    }

    fn visit(&mut self, slot: Slot) -> Result<ResolutionStatus> {
        self.expect_phase(Phase::AwaitingVisit, "visit a zone")?;
        let actor = self.state.active_player();
        let here = self.state.players[actor].zone;
        if !slot.is_valid() || !here.reachable().contains(&slot) {
            return Err(EngineError::illegal(format!(
                "{} cannot reach {} from {}",
                actor, slot, here
            )));
        }

        let def = self
            .state
            .zone_definition(slot)
            .ok_or_else(|| EngineError::script(format!("{} has no zone bound", slot)))?;
        let script = def.script.steps().to_vec();
        let name = def.name.clone();

        self.state.phase = Phase::ResolvingZoneEntry;
        if slot != here {
            self.state.player_mut(actor).zone = slot;
            self.pay_visit_bonuses(slot);
        }
        self.state.note(Verbosity::Normal, LogCategory::Turn, Some(actor), || {
            format!("{} visits {} at {}", actor, name, slot)
        });

        let state = &self.state;
        let mut tasks: Vec<Task> = EffectResolver::raise_with(state, TriggerCategory::Visit, actor, None)
            .into_iter()
            .collect();
        let ctx = ResolutionContext::new(actor, EffectSource::Zone(slot));
        tasks.push(Task::Run(Frame::new(script, ctx)));
        tasks.extend(EffectResolver::raise_with(state, TriggerCategory::PostVisit, actor, None));

        self.state.stack.push_all(tasks);
        self.drive()
    }

    fn pay_visit_bonuses(&mut self, slot: Slot) {
        let base_bonus = self.state.rules.base_visit_bonus;
        let hq_bonus = self.state.rules.hq_visit_bonus;

        let base_owners: Vec<PlayerId> = self
            .state
            .players
            .iter()
            .filter(|(_, p)| p.bases.contains(&slot))
            .map(|(id, _)| id)
            .collect();
        for owner in base_owners {
            Economy::gain(&mut self.state.player_mut(owner).coins, base_bonus);
            self.state.note(Verbosity::Normal, LogCategory::Zone, Some(owner), || {
                format!("{} collects {} from its base at {}", owner, base_bonus, slot)
            });
        }

        let hq_owner = self
            .state
            .players
            .iter()
            .find(|(_, p)| p.hq == Some(slot))
            .map(|(id, _)| id);
        if let Some(owner) = hq_owner {
            Economy::gain(&mut self.state.player_mut(owner).coins, hq_bonus);
            self.state.note(Verbosity::Normal, LogCategory::Zone, Some(owner), || {
                format!("{} collects {} from its HQ at {}", owner, hq_bonus, slot)
            });
        }
    }

    fn spend_action(&mut self) -> Result<()> {
        if self.state.actions_remaining == 0 {
            return Err(EngineError::illegal("no actions left this turn"));
        }
        self.state.actions_remaining -= 1;
        Ok(())
    }

    fn play(&mut self, index: usize) -> Result<ResolutionStatus> {
        self.expect_phase(Phase::AwaitingAction, "play a card")?;
        self.spend_action()?;
        let actor = self.state.active_player();
        let card = self.state.take_from_hand(actor, index)?;
        self.state.in_play.push_back(card);
        self.state.phase = Phase::ResolvingAction;

        let name = self.state.card_name(card);
        self.state.note(Verbosity::Normal, LogCategory::Turn, Some(actor), || {
            format!("{} plays {}", actor, name)
        });

        let tasks = EffectResolver::play_tasks(&self.state, actor, card, 1, None)?;
        self.state.stack.push_all(tasks);
        self.drive()
    }

    fn score(&mut self, index: usize) -> Result<ResolutionStatus> {
        self.expect_phase(Phase::AwaitingAction, "score a card")?;
        self.spend_action()?;
        let actor = self.state.active_player();
        let card = self.state.take_from_hand(actor, index)?;
        self.state.in_play.push_back(card);
        self.state.phase = Phase::ResolvingAction;

        let name = self.state.card_name(card);
        self.state.note(Verbosity::Normal, LogCategory::Turn, Some(actor), || {
            format!("{} scores {}", actor, name)
        });

        let tasks = EffectResolver::score_tasks(&self.state, actor, card)?;
        self.state.stack.push_all(tasks);
        self.drive()
    }

    fn end_turn_now(&mut self) -> Result<ResolutionStatus> {
        self.expect_phase(Phase::AwaitingAction, "end the turn")?;
        let actor = self.state.active_player();
        self.state.phase = Phase::ResolvingTurnEnd;
        if let Some(task) = EffectResolver::raise_with(&self.state, TriggerCategory::TurnEnd, actor, None) {
            self.state.stack.push(task);
        }
        self.drive()
    }

    /// Run the stack and apply the phase transition once it drains.
    fn drive(&mut self) -> Result<ResolutionStatus> {
        let status = EffectResolver::run(&mut self.state)?;
        if status.is_complete() {
            match self.state.phase {
                Phase::ResolvingZoneEntry | Phase::ResolvingAction => {
                    self.state.phase = Phase::AwaitingAction;
                }
                Phase::ResolvingTurnEnd => self.advance_turn(),
                Phase::AwaitingVisit | Phase::AwaitingAction | Phase::Finished => {}
            }
        }
        Ok(status)
    }

    fn advance_turn(&mut self) {
        let state = &mut self.state;
        let extra = state.extra_turns > 0;
        if extra {
            state.extra_turns -= 1;
        } else {
            state.active = (state.active + 1) % state.turn_order.len();
        }
        state.turn_number += 1;
        state.actions_remaining = state.rules.actions_per_turn;
        state.phase = Phase::AwaitingVisit;

        let next = state.active_player();
        let turn = state.turn_number;
        state.note(Verbosity::Minimal, LogCategory::Turn, Some(next), || {
            if extra {
                format!("Turn {}: {} takes an extra turn", turn, next)
            } else {
                format!("Turn {}: {} to move", turn, next)
            }
        });
    }

    /// Stop the game. Any open choice and unfinished work is dropped.
    pub fn finish(&mut self) {
        self.state.pending = None;
        self.state.stack.clear();
        self.state.phase = Phase::Finished;
        self.state.note(Verbosity::Minimal, LogCategory::Turn, None, || {
            "Game finished".to_string()
        });
    }

    pub fn visit_zone(&mut self, slot: Slot) -> Result<ResolutionStatus> {
        self.apply(Command::VisitZone(slot))
    }

    /// Play a hand card as an action, or answer a play/copy prompt.
    pub fn play_card(&mut self, index: usize) -> Result<ResolutionStatus> {
        self.apply(Command::PlayCard(index))
    }

    pub fn score_card(&mut self, index: usize) -> Result<ResolutionStatus> {
        self.apply(Command::ScoreCard(index))
    }

    pub fn end_turn(&mut self) -> Result<ResolutionStatus> {
        self.apply(Command::EndTurn)
    }

    pub fn discard_many(&mut self, indices: impl IntoIterator<Item = usize>) -> Result<ResolutionStatus> {
        self.apply(Command::DiscardMany(indices.into_iter().collect()))
    }

    pub fn discard_and_continue(&mut self, index: usize) -> Result<ResolutionStatus> {
        self.apply(Command::DiscardAndContinue(index))
    }

    pub fn pass_card(&mut self, index: usize) -> Result<ResolutionStatus> {
        self.apply(Command::PassCard(index))
    }

    pub fn move_to(&mut self, slot: Slot) -> Result<ResolutionStatus> {
        self.apply(Command::Move(slot))
    }

    pub fn advance_crown(&mut self, age: Age) -> Result<ResolutionStatus> {
        self.apply(Command::AdvanceCrown(age))
    }

    pub fn retreat_crown(&mut self, age: Age) -> Result<ResolutionStatus> {
        self.apply(Command::RetreatCrown(age))
    }

    /// Pick option `index` of the open prompt.
    pub fn choose(&mut self, index: usize) -> Result<ResolutionStatus> {
        self.apply(Command::Choose(index))
    }

    pub fn submit_choice(&mut self, answer: Answer) -> Result<ResolutionStatus> {
        self.apply(Command::SubmitChoice(answer))
    }

    pub fn change_history(&mut self, slot: Slot) -> Result<ResolutionStatus> {
        self.apply(Command::ChangeHistory(slot))
    }

    pub fn decline_change_history(&mut self) -> Result<ResolutionStatus> {
        self.apply(Command::DeclineChangeHistory)
    }

    // === Legal commands ===

    /// Representative legal commands for the current decision point.
    ///
    /// Multi-card discards are offered as single picks plus the smallest
    /// allowed selection; declinable prompts include the decline.
    #[must_use]
    pub fn legal_commands(&self) -> Vec<Command> {
        let state = &self.state;
        if state.phase == Phase::Finished {
            return Vec::new();
        }
        if let Some(choice) = &state.pending {
            return Self::answers(choice);
        }

        let actor = state.active_player();
        match state.phase {
            Phase::AwaitingVisit => state.players[actor]
                .zone
                .reachable()
                .into_iter()
                .map(Command::VisitZone)
                .collect(),
            Phase::AwaitingAction => {
                let mut out = Vec::new();
                if state.actions_remaining > 0 {
                    let hand = &state.players[actor].hand;
                    out.extend((0..hand.len()).map(Command::PlayCard));
                    out.extend(
                        hand.iter()
                            .enumerate()
                            .filter(|(_, card)| state.catalog.card(**card).is_some_and(|d| d.is_scorable()))
                            .map(|(i, _)| Command::ScoreCard(i)),
                    );
                }
                out.push(Command::EndTurn);
                out
            }
            _ => Vec::new(),
        }
    }

    fn answers(choice: &PendingChoice) -> Vec<Command> {
        let mut out = Vec::new();
        match &choice.options {
            ChoiceOptions::Labels(labels) => out.extend((0..labels.len()).map(Command::Choose)),
            ChoiceOptions::HandCards(offered) => match choice.kind {
                ChoiceKind::Discard => {
                    if choice.min <= 1 && choice.max >= 1 {
                        out.extend(offered.iter().map(|i| Command::DiscardAndContinue(*i)));
                    }
                    if choice.min == 0 {
                        out.push(Command::DiscardMany(Vec::new()));
                    } else if choice.min > 1 {
                        out.push(Command::DiscardMany(offered.iter().take(choice.min).copied().collect()));
                    }
                }
                ChoiceKind::PlayCard | ChoiceKind::CopyEffect => {
                    out.extend(offered.iter().map(|i| Command::PlayCard(*i)));
                }
                ChoiceKind::PassCard => out.extend(offered.iter().map(|i| Command::PassCard(*i))),
                _ => out.extend((0..offered.len()).map(Command::Choose)),
            },
            ChoiceOptions::Slots(slots) => match choice.kind {
                ChoiceKind::Move => out.extend(slots.iter().map(|s| Command::Move(*s))),
                ChoiceKind::ChangeHistory => out.extend(slots.iter().map(|s| Command::ChangeHistory(*s))),
                _ => out.extend((0..slots.len()).map(Command::Choose)),
            },
            ChoiceOptions::Ages(ages) => match choice.kind {
                ChoiceKind::AdvanceCrown => out.extend(ages.iter().map(|a| Command::AdvanceCrown(*a))),
                ChoiceKind::RetreatCrown => out.extend(ages.iter().map(|a| Command::RetreatCrown(*a))),
                _ => out.extend((0..ages.len()).map(Command::Choose)),
            },
            ChoiceOptions::Perpetuals(refs) => out.extend((0..refs.len()).map(Command::Choose)),
        }
        if choice.declinable {
            out.push(if choice.kind == ChoiceKind::ChangeHistory {
                Command::DeclineChangeHistory
            } else {
                Command::SubmitChoice(Answer::Decline)
            });
        }
        out
    }

    // === Queries ===

    /// The full state, read-only.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self, player: PlayerId) -> Result<&Player> {
        self.state.player(player)
    }

    pub fn coins(&self, player: PlayerId) -> Result<u32> {
        Ok(self.player(player)?.coins)
    }

    pub fn hand(&self, player: PlayerId) -> Result<&Vector<CardId>> {
        Ok(&self.player(player)?.hand)
    }

    pub fn hand_size(&self, player: PlayerId) -> Result<usize> {
        Ok(self.player(player)?.hand.len())
    }

    pub fn perpetuals(&self, player: PlayerId, category: TriggerCategory) -> Result<Vector<CardId>> {
        Ok(self.player(player)?.perpetuals_for(category))
    }

    /// Copies of `card` held as perpetuals, across all categories.
    pub fn perpetual_count(&self, player: PlayerId, card: CardId) -> Result<usize> {
        Ok(self.player(player)?.perpetual_count(card))
    }

    pub fn score_track(&self, player: PlayerId) -> Result<[u8; 4]> {
        Ok(self.player(player)?.score_track.as_array())
    }

    pub fn zone(&self, player: PlayerId) -> Result<Slot> {
        Ok(self.player(player)?.zone)
    }

    pub fn has_base(&self, player: PlayerId, slot: Slot) -> Result<bool> {
        Ok(self.player(player)?.bases.contains(&slot))
    }

    pub fn hq(&self, player: PlayerId) -> Result<Option<Slot>> {
        Ok(self.player(player)?.hq)
    }

    pub fn hourglass(&self, slot: Slot) -> Result<u8> {
        Self::check_slot(slot)?;
        Ok(self.state.zones.hourglass(slot))
    }

    pub fn zone_binding(&self, slot: Slot) -> Result<ZoneDefId> {
        Self::check_slot(slot)?;
        Ok(self.state.zones.binding(slot))
    }

    fn check_slot(slot: Slot) -> Result<()> {
        if slot.is_valid() {
            Ok(())
        } else {
            Err(EngineError::illegal(format!("{} is not on the board", slot)))
        }
    }

    #[must_use]
    pub fn discard_pile(&self) -> &Vector<CardId> {
        self.state.discard_pile()
    }

    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.state.deck.len()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.state.active_player()
    }

    #[must_use]
    pub fn actions_remaining(&self) -> u32 {
        self.state.actions_remaining
    }

    #[must_use]
    pub fn pending_choice(&self) -> Option<&PendingChoice> {
        self.state.pending.as_ref()
    }

    /// Players ruling `age`; ties all rule.
    #[must_use]
    pub fn rulers(&self, age: Age) -> Vec<PlayerId> {
        CrownLedger::rulers(&self.state.players, age)
    }

    #[must_use]
    pub fn rebind_history(&self) -> &Vector<RebindRecord> {
        self.state.zones.rebinds()
    }

    #[must_use]
    pub fn log(&self) -> &GameLog {
        &self.state.log
    }

    #[must_use]
    pub fn history(&self) -> &Vector<CommandRecord> {
        &self.state.history
    }
}

impl RulesEngine for Game {
    fn legal_commands(&self) -> Vec<Command> {
        Game::legal_commands(self)
    }

    fn apply(&mut self, command: Command) -> Result<ResolutionStatus> {
        Game::apply(self, command)
    }

    fn is_finished(&self) -> bool {
        self.state.phase == Phase::Finished
    }
}
