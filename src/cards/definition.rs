//! Card definitions - static card data.
//!
//! A `CardDefinition` is an immutable value: a name plus the effect
//! scripts that run when the card is played, scored, or fires as a
//! perpetual. Hands, perpetual slots and piles hold `CardId`s that point
//! back here, never mutable copies.

use serde::{Deserialize, Serialize};

use crate::effects::{EffectScript, Step};

/// Unique identifier for a card definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use temporum_engine::cards::{CardDefinition, CardId};
/// use temporum_engine::effects::Step;
///
/// let artist = CardDefinition::new(CardId::new(1), "Artist")
///     .on_play([Step::gain(6)]);
///
/// assert_eq!(artist.play.len(), 1);
/// assert!(artist.score.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    /// Runs when the card is played.
    pub play: EffectScript,
    /// Runs when the card is scored. Cards without one cannot be scored.
    pub score: Option<EffectScript>,
    /// Runs each time the card fires as a perpetual.
    pub reactive: EffectScript,
}

impl CardDefinition {
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            play: EffectScript::default(),
            score: None,
            reactive: EffectScript::default(),
        }
    }

    /// Set the play script (builder pattern).
    #[must_use]
    pub fn on_play(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.play = EffectScript::new(steps);
        self
    }

    /// Set the score script (builder pattern).
    #[must_use]
    pub fn on_score(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.score = Some(EffectScript::new(steps));
        self
    }

    /// Set the perpetual script (builder pattern).
    #[must_use]
    pub fn on_trigger(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.reactive = EffectScript::new(steps);
        self
    }

    #[must_use]
    pub fn is_scorable(&self) -> bool {
        self.score.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::TriggerCategory;

    #[test]
    fn test_card_id() {
        let id = CardId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Card(42)");
    }

    #[test]
    fn test_card_builder() {
        let card = CardDefinition::new(CardId::new(7), "Gang of Pickpockets")
            .on_play([Step::perpetual(TriggerCategory::PostPlay)])
            .on_trigger([Step::draw(1)]);

        assert_eq!(card.name, "Gang of Pickpockets");
        assert_eq!(card.play.len(), 1);
        assert_eq!(card.reactive.len(), 1);
        assert!(!card.is_scorable());
    }

    #[test]
    fn test_card_serialization() {
        let card = CardDefinition::new(CardId::new(1), "Patron")
            .on_play([Step::gain(1)])
            .on_score([Step::gain(2)]);

        let json = serde_json::to_string(&card).unwrap();
        let back: CardDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(card, back);
    }
}
