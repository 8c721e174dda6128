//! What a running script knows about itself.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::{PlayerId, Slot};

/// Where a running script came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectSource {
    /// A card's play or score script, or a copied play script.
    Card(CardId),
    /// A zone's visit script. Only these may touch the slot's hourglass.
    Zone(Slot),
    /// A perpetual's reactive script.
    Perpetual(CardId),
}

impl EffectSource {
    #[must_use]
    pub fn card(self) -> Option<CardId> {
        match self {
            EffectSource::Card(card) | EffectSource::Perpetual(card) => Some(card),
            EffectSource::Zone(_) => None,
        }
    }

    #[must_use]
    pub fn zone(self) -> Option<Slot> {
        match self {
            EffectSource::Zone(slot) => Some(slot),
            _ => None,
        }
    }
}

impl std::fmt::Display for EffectSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffectSource::Card(card) => write!(f, "{}", card),
            EffectSource::Zone(slot) => write!(f, "zone at {}", slot),
            EffectSource::Perpetual(card) => write!(f, "perpetual {}", card),
        }
    }
}

/// A hand card a script was bound to, remembered by index and identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundCard {
    pub index: usize,
    pub card: CardId,
}

/// Per-script execution context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionContext {
    /// Player the script acts for. Prompts go to this player.
    pub actor: PlayerId,
    pub source: EffectSource,
    pub bound: Option<BoundCard>,
    /// Running counters read by `Amount::Discarded` / `Amount::Drawn`.
    pub discarded: u32,
    pub drawn: u32,
}

impl ResolutionContext {
    #[must_use]
    pub fn new(actor: PlayerId, source: EffectSource) -> Self {
        Self {
            actor,
            source,
            bound: None,
            discarded: 0,
            drawn: 0,
        }
    }

    #[must_use]
    pub fn with_bound(mut self, bound: Option<BoundCard>) -> Self {
        self.bound = bound;
        self
    }

    /// Fresh context for a nested script: same source, new actor, zeroed counters.
    #[must_use]
    pub fn for_actor(&self, actor: PlayerId) -> Self {
        Self::new(actor, self.source)
    }
}
