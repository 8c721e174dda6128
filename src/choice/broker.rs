//! Suspend/resume protocol for player decisions.
//!
//! A step that needs a decision returns a [`PendingChoice`]; the resolver
//! hands it to [`ChoiceBroker::request`], which parks it on the game state
//! and stops the run loop. The driver answers with a [`Command`], which
//! [`ChoiceBroker::translate`] turns into an [`Answer`].
//! [`ChoiceBroker::submit`] validates the answer against the open choice
//! and leaves it on the suspended frame, which re-executes its step and
//! consumes it.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::CardId;
use crate::core::{Age, Command, GameState, PlayerId, Slot};
use crate::effects::EffectSource;
use crate::error::{EngineError, Result};
use crate::log::{LogCategory, Verbosity};
use crate::triggers::TriggerCategory;

/// What the prompt is about. Typed answer commands must match it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceKind {
    /// Pick a labelled branch.
    Branch,
    Discard,
    /// Pick a hand card to play.
    PlayCard,
    /// Pick a hand card whose effect is used without playing it.
    CopyEffect,
    PassCard,
    Move,
    AdvanceCrown,
    RetreatCrown,
    ChangeHistory,
    /// Pick a card to install or remove as a perpetual, or one to replay.
    Perpetual,
}

/// A perpetual held by some player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerpetualRef {
    pub owner: PlayerId,
    pub category: TriggerCategory,
    pub card: CardId,
}

/// The offered options, typed by what they refer to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceOptions {
    Labels(Vec<String>),
    /// Indices into the chooser's hand.
    HandCards(SmallVec<[usize; 8]>),
    Slots(SmallVec<[Slot; 4]>),
    Ages(SmallVec<[Age; 4]>),
    Perpetuals(Vec<PerpetualRef>),
}

impl ChoiceOptions {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ChoiceOptions::Labels(v) => v.len(),
            ChoiceOptions::HandCards(v) => v.len(),
            ChoiceOptions::Slots(v) => v.len(),
            ChoiceOptions::Ages(v) => v.len(),
            ChoiceOptions::Perpetuals(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The single outstanding decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChoice {
    pub kind: ChoiceKind,
    /// Who must answer.
    pub player: PlayerId,
    pub prompt: String,
    pub options: ChoiceOptions,
    /// Cardinality bounds; only hand-card prompts use values other than 1.
    pub min: usize,
    pub max: usize,
    pub declinable: bool,
    pub source: EffectSource,
}

impl PendingChoice {
    /// A pick-one prompt.
    pub fn single(
        kind: ChoiceKind,
        player: PlayerId,
        prompt: impl Into<String>,
        options: ChoiceOptions,
        source: EffectSource,
    ) -> Self {
        Self {
            kind,
            player,
            prompt: prompt.into(),
            options,
            min: 1,
            max: 1,
            declinable: false,
            source,
        }
    }

    #[must_use]
    pub fn declinable(mut self, declinable: bool) -> Self {
        self.declinable = declinable;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, min: usize, max: usize) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

/// A validated or raw answer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    /// Position in the option list; valid for every prompt.
    Option(usize),
    /// Hand indices.
    Cards(Vec<usize>),
    Slot(Slot),
    Age(Age),
    Perpetual(PerpetualRef),
    Decline,
}

pub struct ChoiceBroker;

impl ChoiceBroker {
    /// Park `choice` on the state.
    pub fn request(state: &mut GameState, choice: PendingChoice) {
        state.note(Verbosity::Normal, LogCategory::Choice, Some(choice.player), || {
            format!(
                "{} must choose ({:?}, {} options): {}",
                choice.player,
                choice.kind,
                choice.options.len(),
                choice.prompt
            )
        });
        state.pending = Some(choice);
    }

    /// Turn a driver command into an answer for `pending`.
    pub fn translate(pending: &PendingChoice, command: &Command) -> Result<Answer> {
        let expect = |kinds: &[ChoiceKind]| {
            if kinds.contains(&pending.kind) {
                Ok(())
            } else {
                Err(EngineError::invalid_answer(format!(
                    "'{}' does not answer a {:?} prompt",
                    command, pending.kind
                )))
            }
        };

        match command {
            Command::Choose(i) => Ok(Answer::Option(*i)),
            Command::SubmitChoice(answer) => Ok(answer.clone()),
            Command::DiscardMany(cards) => {
                expect(&[ChoiceKind::Discard])?;
                Ok(Answer::Cards(cards.clone()))
            }
            Command::DiscardAndContinue(i) => {
                expect(&[ChoiceKind::Discard])?;
                Ok(Answer::Cards(vec![*i]))
            }
            Command::PlayCard(i) => {
                expect(&[ChoiceKind::PlayCard, ChoiceKind::CopyEffect])?;
                Ok(Answer::Cards(vec![*i]))
            }
            Command::PassCard(i) => {
                expect(&[ChoiceKind::PassCard])?;
                Ok(Answer::Cards(vec![*i]))
            }
            Command::Move(slot) => {
                expect(&[ChoiceKind::Move])?;
                Ok(Answer::Slot(*slot))
            }
            Command::AdvanceCrown(age) => {
                expect(&[ChoiceKind::AdvanceCrown])?;
                Ok(Answer::Age(*age))
            }
            Command::RetreatCrown(age) => {
                expect(&[ChoiceKind::RetreatCrown])?;
                Ok(Answer::Age(*age))
            }
            Command::ChangeHistory(slot) => {
                expect(&[ChoiceKind::ChangeHistory])?;
                Ok(Answer::Slot(*slot))
            }
            Command::DeclineChangeHistory => {
                expect(&[ChoiceKind::ChangeHistory])?;
                Ok(Answer::Decline)
            }
            Command::VisitZone(_) | Command::ScoreCard(_) | Command::EndTurn => Err(
                EngineError::illegal(format!("'{}' is not allowed while a choice is open", command)),
            ),
        }
    }

    /// Check `answer` against `pending` and normalize it: `Option(i)`
    /// becomes the typed answer for option `i`, and an empty card list on
    /// a prompt that allows zero cards stays an empty list.
    pub fn validate(pending: &PendingChoice, answer: Answer) -> Result<Answer> {
        if answer == Answer::Decline {
            return if pending.declinable {
                Ok(Answer::Decline)
            } else {
                Err(EngineError::invalid_answer("this choice cannot be declined"))
            };
        }

        let out_of_range = |i: usize| {
            EngineError::invalid_answer(format!(
                "option {} out of range (0..{})",
                i,
                pending.options.len()
            ))
        };

        match (&pending.options, answer) {
            (ChoiceOptions::Labels(labels), Answer::Option(i)) => {
                if i < labels.len() {
                    Ok(Answer::Option(i))
                } else {
                    Err(out_of_range(i))
                }
            }
            (ChoiceOptions::HandCards(offered), Answer::Option(i)) => {
                let index = *offered.get(i).ok_or_else(|| out_of_range(i))?;
                Self::check_cards(pending, offered, vec![index])
            }
            (ChoiceOptions::HandCards(offered), Answer::Cards(cards)) => {
                Self::check_cards(pending, offered, cards)
            }
            (ChoiceOptions::Slots(slots), Answer::Option(i)) => {
                slots.get(i).map(|s| Answer::Slot(*s)).ok_or_else(|| out_of_range(i))
            }
            (ChoiceOptions::Slots(slots), Answer::Slot(slot)) => {
                if slots.contains(&slot) {
                    Ok(Answer::Slot(slot))
                } else {
                    Err(EngineError::invalid_answer(format!("{} was not offered", slot)))
                }
            }
            (ChoiceOptions::Ages(ages), Answer::Option(i)) => {
                ages.get(i).map(|a| Answer::Age(*a)).ok_or_else(|| out_of_range(i))
            }
            (ChoiceOptions::Ages(ages), Answer::Age(age)) => {
                if ages.contains(&age) {
                    Ok(Answer::Age(age))
                } else {
                    Err(EngineError::invalid_answer(format!("{} was not offered", age)))
                }
            }
            (ChoiceOptions::Perpetuals(refs), Answer::Option(i)) => {
                refs.get(i).map(|r| Answer::Perpetual(*r)).ok_or_else(|| out_of_range(i))
            }
            (ChoiceOptions::Perpetuals(refs), Answer::Perpetual(r)) => {
                if refs.contains(&r) {
                    Ok(Answer::Perpetual(r))
                } else {
                    Err(EngineError::invalid_answer(format!(
                        "perpetual {} was not offered",
                        r.card
                    )))
                }
            }
            (_, other) => Err(EngineError::invalid_answer(format!(
                "{:?} does not fit a {:?} prompt",
                other, pending.kind
            ))),
        }
    }

    fn check_cards(pending: &PendingChoice, offered: &[usize], cards: Vec<usize>) -> Result<Answer> {
        if cards.len() < pending.min || cards.len() > pending.max {
            return Err(EngineError::invalid_answer(format!(
                "expected between {} and {} cards, got {}",
                pending.min,
                pending.max,
                cards.len()
            )));
        }
        for (pos, index) in cards.iter().enumerate() {
            if !offered.contains(index) {
                return Err(EngineError::invalid_answer(format!(
                    "hand card {} was not offered",
                    index
                )));
            }
            if cards[..pos].contains(index) {
                return Err(EngineError::invalid_answer(format!(
                    "hand card {} chosen twice",
                    index
                )));
            }
        }
        Ok(Answer::Cards(cards))
    }

    /// Validate `answer`, close the open choice, and leave the answer on
    /// the suspended frame. The caller resumes the run loop.
    pub fn submit(state: &mut GameState, answer: Answer) -> Result<()> {
        let pending = state
            .pending
            .as_ref()
            .ok_or_else(|| EngineError::illegal("no choice is open"))?;
        let answer = Self::validate(pending, answer)?;
        let player = pending.player;

        let frame = state
            .stack
            .top_frame_mut()
            .ok_or_else(|| EngineError::script("open choice has no suspended frame"))?;
        frame.answer = Some(answer.clone());
        state.pending = None;

        state.note(Verbosity::Normal, LogCategory::Choice, Some(player), || {
            format!("{} answered {:?}", player, answer)
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn discard_prompt(min: usize, max: usize, declinable: bool) -> PendingChoice {
        PendingChoice::single(
            ChoiceKind::Discard,
            PlayerId::new(0),
            "Discard",
            ChoiceOptions::HandCards(smallvec![0, 1, 2]),
            EffectSource::Card(CardId::new(4)),
        )
        .with_bounds(min, max)
        .declinable(declinable)
    }

    #[test]
    fn test_card_cardinality_and_membership() {
        let pending = discard_prompt(0, 3, false);
        assert_eq!(
            ChoiceBroker::validate(&pending, Answer::Cards(vec![])).unwrap(),
            Answer::Cards(vec![])
        );
        assert!(ChoiceBroker::validate(&pending, Answer::Cards(vec![0, 2])).is_ok());
        assert!(ChoiceBroker::validate(&pending, Answer::Cards(vec![3])).is_err());
        assert!(ChoiceBroker::validate(&pending, Answer::Cards(vec![1, 1])).is_err());

        let strict = discard_prompt(1, 1, false);
        assert!(ChoiceBroker::validate(&strict, Answer::Cards(vec![])).is_err());
        assert!(ChoiceBroker::validate(&strict, Answer::Cards(vec![0, 1])).is_err());
    }

    #[test]
    fn test_decline_rights() {
        assert!(matches!(
            ChoiceBroker::validate(&discard_prompt(1, 1, false), Answer::Decline),
            Err(EngineError::InvalidChoiceAnswer(_))
        ));
        assert_eq!(
            ChoiceBroker::validate(&discard_prompt(1, 1, true), Answer::Decline).unwrap(),
            Answer::Decline
        );
    }

    #[test]
    fn test_option_normalization() {
        let ages = PendingChoice::single(
            ChoiceKind::AdvanceCrown,
            PlayerId::new(0),
            "Advance",
            ChoiceOptions::Ages(Age::ALL.into_iter().collect()),
            EffectSource::Card(CardId::new(5)),
        );
        assert_eq!(
            ChoiceBroker::validate(&ages, Answer::Option(1)).unwrap(),
            Answer::Age(Age::II)
        );
        assert!(ChoiceBroker::validate(&ages, Answer::Option(4)).is_err());
        assert!(ChoiceBroker::validate(&ages, Answer::Slot(Slot(0))).is_err());

        let hand = discard_prompt(1, 1, false);
        assert_eq!(
            ChoiceBroker::validate(&hand, Answer::Option(2)).unwrap(),
            Answer::Cards(vec![2])
        );
    }

    #[test]
    fn test_translate_checks_kind() {
        let pending = discard_prompt(0, 3, false);
        assert_eq!(
            ChoiceBroker::translate(&pending, &Command::DiscardAndContinue(1)).unwrap(),
            Answer::Cards(vec![1])
        );
        assert!(matches!(
            ChoiceBroker::translate(&pending, &Command::Move(Slot(2))),
            Err(EngineError::InvalidChoiceAnswer(_))
        ));
        assert!(matches!(
            ChoiceBroker::translate(&pending, &Command::EndTurn),
            Err(EngineError::IllegalCommand(_))
        ));
        assert_eq!(
            ChoiceBroker::translate(&pending, &Command::Choose(0)).unwrap(),
            Answer::Option(0)
        );
    }
}
