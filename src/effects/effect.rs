//! Effect scripts as data.
//!
//! Every card and zone effect is an [`EffectScript`]: an ordered list of
//! [`Step`]s from a closed set. Steps never hold closures, so a card can
//! embed any other card's script by id and a suspended script can be
//! cloned, inspected and serialized mid-flight.

use serde::{Deserialize, Serialize};

use super::targeting::{AgeRule, CardRef, DiscardSelector, OpponentFilter, ZoneRule};
use crate::cards::CardId;
use crate::ledger::Shortfall;
use crate::triggers::TriggerCategory;

/// A quantity a step reads when it executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Amount {
    Fixed(u32),
    /// Cards discarded so far by this script.
    Discarded,
    /// Cards drawn so far by this script.
    Drawn,
    /// The running zone's hourglass.
    Hourglass,
}

impl From<u32> for Amount {
    fn from(n: u32) -> Self {
        Amount::Fixed(n)
    }
}

/// Predicate for [`Step::If`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// The actor rules the Age (alone, when `sole`).
    RulesAge { age: AgeRule, sole: bool },
    /// The running zone's hourglass is at least this high.
    HourglassAtLeast(u8),
    CoinsAtLeast(u32),
    HandAtLeast(usize),
    /// This script has discarded at least this many cards.
    DiscardedAtLeast(u32),
    Not(Box<Condition>),
}

impl Condition {
    #[must_use]
    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }
}

/// One labelled option of a [`Step::ConditionalChoice`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChoiceBranch {
    pub label: String,
    pub steps: Vec<Step>,
}

impl ChoiceBranch {
    pub fn new(label: impl Into<String>, steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            label: label.into(),
            steps: steps.into_iter().collect(),
        }
    }
}

/// Which script a [`Step::SubEffect`] runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubEffect {
    /// Another card's play script.
    Card(CardId),
    /// The play script of a hand card the actor picks. The card stays in hand.
    ChooseFromHand,
    /// A held perpetual's reactive script, optionally bound to a hand card.
    ReplayPerpetual { with_hand_card: bool },
}

/// A single instruction of an effect script.
///
/// Steps that cannot do anything (nothing to pay with, nothing to
/// discard, no crown to move) are silent no-ops. Only malformed scripts
/// produce errors.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    GainCoins(Amount),
    LoseCoins { amount: Amount, shortfall: Shortfall },
    DrawCards(Amount),
    DiscardCards(DiscardSelector),
    MoveToZone(ZoneRule),
    AdvanceCrown(AgeRule),
    RetreatCrown(AgeRule),
    AddPerpetual { card: CardRef, category: TriggerCategory },
    RemovePerpetual { card: CardRef, category: Option<TriggerCategory> },
    ConditionalChoice {
        prompt: String,
        branches: Vec<ChoiceBranch>,
        declinable: bool,
    },
    SubEffect(SubEffect),
    If {
        condition: Condition,
        then: Vec<Step>,
        otherwise: Vec<Step>,
    },
    /// Play a hand card, running its play script `times` times.
    PlayFromHand { times: u8 },
    /// Give a hand card to the next player in turn order.
    PassCard,
    GrantActions(u32),
    ExtraTurn,
    ForEachOpponent { filter: OpponentFilter, steps: Vec<Step> },
    TickHourglass,
    ResetHourglass,
    /// Rebind a simulated zone to its real definition.
    BecomeReal,
    ChangeHistory,
    PlaceBase,
    PlaceHq,
}

impl Step {
    #[must_use]
    pub fn gain(n: u32) -> Self {
        Step::GainCoins(Amount::Fixed(n))
    }

    #[must_use]
    pub fn lose(n: u32, shortfall: Shortfall) -> Self {
        Step::LoseCoins {
            amount: Amount::Fixed(n),
            shortfall,
        }
    }

    #[must_use]
    pub fn draw(n: u32) -> Self {
        Step::DrawCards(Amount::Fixed(n))
    }

    /// Install the running card as a perpetual under `category`.
    #[must_use]
    pub fn perpetual(category: TriggerCategory) -> Self {
        Step::AddPerpetual {
            card: CardRef::This,
            category,
        }
    }

    #[must_use]
    pub fn discard_one(optional: bool) -> Self {
        Step::DiscardCards(DiscardSelector::One { optional })
    }

    #[must_use]
    pub fn when(condition: Condition, then: impl IntoIterator<Item = Step>) -> Self {
        Step::If {
            condition,
            then: then.into_iter().collect(),
            otherwise: Vec::new(),
        }
    }

    #[must_use]
    pub fn choice(prompt: impl Into<String>, branches: impl IntoIterator<Item = ChoiceBranch>) -> Self {
        Step::ConditionalChoice {
            prompt: prompt.into(),
            branches: branches.into_iter().collect(),
            declinable: false,
        }
    }
}

/// An ordered list of steps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectScript {
    steps: Vec<Step>,
}

impl EffectScript {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl From<Vec<Step>> for EffectScript {
    fn from(steps: Vec<Step>) -> Self {
        Self { steps }
    }
}
