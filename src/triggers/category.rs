//! Trigger categories and their firing scope.

use serde::{Deserialize, Serialize};

/// Lifecycle point a perpetual is keyed on.
///
/// The derived `Ord` is the firing order within a single action:
/// `play → postPlay → score → postScore → visit → postVisit → draw →
/// advance → turnEnd`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TriggerCategory {
    Play,
    PostPlay,
    Score,
    PostScore,
    Visit,
    PostVisit,
    Draw,
    Advance,
    TurnEnd,
}

/// Whose perpetuals a category consults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerScope {
    /// Only the acting player's perpetuals fire.
    Actor,
    /// Every player's perpetuals fire, acting player first.
    AllPlayers,
}

impl TriggerCategory {
    pub const ALL: [TriggerCategory; 9] = [
        TriggerCategory::Play,
        TriggerCategory::PostPlay,
        TriggerCategory::Score,
        TriggerCategory::PostScore,
        TriggerCategory::Visit,
        TriggerCategory::PostVisit,
        TriggerCategory::Draw,
        TriggerCategory::Advance,
        TriggerCategory::TurnEnd,
    ];

    #[must_use]
    pub fn scope(self) -> TriggerScope {
        match self {
            TriggerCategory::Visit => TriggerScope::AllPlayers,
            _ => TriggerScope::Actor,
        }
    }

    /// Name as printed on cards.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TriggerCategory::Play => "play",
            TriggerCategory::PostPlay => "postPlay",
            TriggerCategory::Score => "score",
            TriggerCategory::PostScore => "postScore",
            TriggerCategory::Visit => "visit",
            TriggerCategory::PostVisit => "postVisit",
            TriggerCategory::Draw => "draw",
            TriggerCategory::Advance => "advance",
            TriggerCategory::TurnEnd => "turnEnd",
        }
    }
}

impl std::fmt::Display for TriggerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
