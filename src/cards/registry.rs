//! Card registry for definition lookup.

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId};
use crate::error::{EngineError, Result};

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use temporum_engine::cards::{CardRegistry, CardDefinition, CardId};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::new(CardId::new(1), "Artist")).unwrap();
///
/// assert_eq!(registry.get(CardId::new(1)).unwrap().name, "Artist");
/// assert_eq!(registry.find("artist"), Some(CardId::new(1)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
    by_name: FxHashMap<String, CardId>,
}

impl CardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition. Duplicate ids or names are rejected.
    pub fn register(&mut self, card: CardDefinition) -> Result<CardId> {
        if self.cards.contains_key(&card.id) {
            return Err(EngineError::config(format!("{} already registered", card.id)));
        }
        let key = card.name.to_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(EngineError::config(format!(
                "card name '{}' already registered",
                card.name
            )));
        }
        let id = card.id;
        self.by_name.insert(key, id);
        self.cards.insert(id, card);
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Look up a definition, failing with a script error for unknown ids.
    pub fn require(&self, id: CardId) -> Result<&CardDefinition> {
        self.get(id)
            .ok_or_else(|| EngineError::script(format!("unknown card {}", id)))
    }

    /// Find a card id by case-insensitive name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<CardId> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all definitions (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }
}
