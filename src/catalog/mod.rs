//! Catalogs: the card and zone definitions a game is played with.
//!
//! A [`Catalog`] bundles a [`CardRegistry`], a [`ZoneRegistry`], the
//! default slot bindings and the default deck. Games share one catalog
//! through an `Arc`.
//!
//! ```
//! use temporum_engine::catalog::{standard, Catalog};
//!
//! let catalog = Catalog::standard().unwrap();
//! assert_eq!(catalog.card(standard::ARTIST).unwrap().name, "Artist");
//! assert_eq!(catalog.default_bindings()[6], standard::COLD_WAR);
//! ```

pub mod standard;

use crate::cards::{CardDefinition, CardId, CardRegistry};
use crate::core::{Slot, SLOT_COUNT};
use crate::error::{EngineError, Result};
use crate::zones::{ZoneDefId, ZoneDefinition, ZoneRegistry};

#[derive(Clone, Debug)]
pub struct Catalog {
    cards: CardRegistry,
    zones: ZoneRegistry,
    default_bindings: [ZoneDefId; SLOT_COUNT],
    default_deck: Vec<CardId>,
}

impl Catalog {
    /// Assemble and validate a catalog: every binding must name a zone of
    /// the slot's Age, every deck card must exist, and zone links must
    /// stay within one Age.
    pub fn new(
        cards: CardRegistry,
        zones: ZoneRegistry,
        default_bindings: [ZoneDefId; SLOT_COUNT],
        default_deck: Vec<CardId>,
    ) -> Result<Self> {
        zones.validate_links()?;
        for (slot, id) in Slot::all().zip(default_bindings) {
            let def = zones
                .get(id)
                .ok_or_else(|| EngineError::config(format!("{} bound to unknown {}", slot, id)))?;
            if def.age != slot.age() {
                return Err(EngineError::config(format!(
                    "{} ({}) cannot sit at {} ({})",
                    def.name,
                    def.age,
                    slot,
                    slot.age()
                )));
            }
        }
        if let Some(card) = default_deck.iter().find(|c| !cards.contains(**c)) {
            return Err(EngineError::config(format!("default deck contains unknown {}", card)));
        }
        Ok(Self {
            cards,
            zones,
            default_bindings,
            default_deck,
        })
    }

    /// The built-in card and zone set.
    pub fn standard() -> Result<Self> {
        standard::build()
    }

    #[must_use]
    pub fn cards(&self) -> &CardRegistry {
        &self.cards
    }

    #[must_use]
    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(id)
    }

    #[must_use]
    pub fn zone(&self, id: ZoneDefId) -> Option<&ZoneDefinition> {
        self.zones.get(id)
    }

    #[must_use]
    pub fn default_bindings(&self) -> [ZoneDefId; SLOT_COUNT] {
        self.default_bindings
    }

    #[must_use]
    pub fn default_deck(&self) -> &[CardId] {
        &self.default_deck
    }
}
