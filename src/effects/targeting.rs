//! Selectors that steps use to pick their targets.
//!
//! - `AgeRule`: which Age a crown step or ruling check refers to
//! - `ZoneRule`: where a move step sends the traveller
//! - `OpponentFilter`: which other players a group step visits
//! - `DiscardSelector`: how many hand cards a discard step takes
//! - `CardRef`: which card a perpetual step installs or removes

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::{Age, Slot};
use crate::error::{EngineError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeRule {
    Fixed(Age),
    /// The Age of the actor's current slot.
    CurrentZone,
    /// Ask the actor.
    Choose,
}

impl AgeRule {
    /// Resolve without asking anyone. `None` means the rule needs a prompt.
    #[must_use]
    pub fn fixed(self, actor_zone: Slot) -> Option<Age> {
        match self {
            AgeRule::Fixed(age) => Some(age),
            AgeRule::CurrentZone => Some(actor_zone.age()),
            AgeRule::Choose => None,
        }
    }

    /// Resolve where a prompt is not possible (conditions, filters).
    pub fn require_fixed(self, actor_zone: Slot) -> Result<Age> {
        self.fixed(actor_zone)
            .ok_or_else(|| EngineError::script("an Age chosen by prompt cannot be used here"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneRule {
    Slot(Slot),
    /// One slot further along the timeline, wrapping.
    Forward,
    Choose { optional: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpponentFilter {
    /// Opponents whose traveller shares the actor's slot.
    SameZone,
    /// Opponents whose traveller stands in the given Age.
    InAge(AgeRule),
    All,
}

impl OpponentFilter {
    pub fn matches(self, actor_zone: Slot, opponent_zone: Slot) -> Result<bool> {
        Ok(match self {
            OpponentFilter::SameZone => actor_zone == opponent_zone,
            OpponentFilter::InAge(rule) => rule.require_fixed(actor_zone)? == opponent_zone.age(),
            OpponentFilter::All => true,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscardSelector {
    /// The whole hand, no prompt.
    All,
    /// One card: the bound card if there is one, otherwise a prompt.
    One { optional: bool },
    /// Between `min` and `max` cards; `None` means up to the hand size.
    Many { min: usize, max: Option<usize> },
}

impl DiscardSelector {
    /// Cardinality of the prompt for a hand of `hand_size` cards.
    #[must_use]
    pub fn bounds(self, hand_size: usize) -> (usize, usize) {
        match self {
            DiscardSelector::All => (hand_size, hand_size),
            DiscardSelector::One { optional } => (usize::from(!optional), 1),
            DiscardSelector::Many { min, max } => {
                let max = max.unwrap_or(hand_size).min(hand_size);
                (min.min(max), max)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardRef {
    /// The card whose script is running.
    This,
    /// A specific card, taken from the actor's hand or perpetuals.
    Id(CardId),
    /// Ask the actor.
    Chosen,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_rule() {
        assert_eq!(AgeRule::Fixed(Age::III).fixed(Slot(0)), Some(Age::III));
        assert_eq!(AgeRule::CurrentZone.fixed(Slot(7)), Some(Age::IV));
        assert_eq!(AgeRule::Choose.fixed(Slot(7)), None);
        assert!(matches!(
            AgeRule::Choose.require_fixed(Slot(0)),
            Err(EngineError::Script(_))
        ));
    }

    #[test]
    fn test_opponent_filter() {
        assert!(OpponentFilter::SameZone.matches(Slot(4), Slot(4)).unwrap());
        assert!(!OpponentFilter::SameZone.matches(Slot(4), Slot(5)).unwrap());
        assert!(OpponentFilter::InAge(AgeRule::CurrentZone)
            .matches(Slot(4), Slot(5))
            .unwrap());
        assert!(!OpponentFilter::InAge(AgeRule::Fixed(Age::I))
            .matches(Slot(4), Slot(5))
            .unwrap());
        assert!(OpponentFilter::All.matches(Slot(0), Slot(9)).unwrap());
    }

    #[test]
    fn test_discard_bounds() {
        assert_eq!(DiscardSelector::All.bounds(4), (4, 4));
        assert_eq!(DiscardSelector::One { optional: true }.bounds(4), (0, 1));
        assert_eq!(DiscardSelector::One { optional: false }.bounds(4), (1, 1));
        assert_eq!(DiscardSelector::Many { min: 0, max: None }.bounds(3), (0, 3));
        assert_eq!(DiscardSelector::Many { min: 2, max: Some(5) }.bounds(1), (1, 1));
    }
}
