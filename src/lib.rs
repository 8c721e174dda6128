//! # temporum-engine
//!
//! A deterministic, choice-suspending rules engine for the multiplayer
//! time-travel card game Temporum.
//!
//! ## Design Principles
//!
//! 1. **Effects Are Data**: Card, zone and perpetual behaviour is a list of
//!    [`Step`]s run by one interpreter. Copying or replaying an effect just
//!    names another script.
//!
//! 2. **One Decision at a Time**: When a step needs input, the engine parks
//!    a single [`PendingChoice`] and returns control to the driver. The
//!    suspended work lives on an explicit [`ResolutionStack`].
//!
//! 3. **Transactional Commands**: Every command runs against a snapshot.
//!    Rejected commands, including authoring errors deep in a chain, leave
//!    the game untouched.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: `im-rs` makes snapshots O(1), which is
//!   what keeps per-command rollback cheap.
//!
//! - **Zone Indirection**: Board slots point at zone definitions through a
//!   table, so "becomes real" and "change history" are explicit, audited
//!   rebinds.
//!
//! ## Modules
//!
//! - `core`: Board geometry, players, state, commands, RNG, configuration
//! - `cards`: Card definitions and registry
//! - `zones`: Zone definitions, slot bindings, hourglasses
//! - `effects`: Step language and the interpreter
//! - `choice`: Suspend/resume protocol
//! - `triggers`: Perpetual categories and dispatch
//! - `stack`: Resolution stack and frames
//! - `ledger`: Crowns and coins
//! - `rules`: Turn engine and driver interface
//! - `catalog`: Card/zone sets, including the standard one
//! - `log`: Structured game log

pub mod cards;
pub mod catalog;
pub mod choice;
pub mod core;
pub mod effects;
pub mod error;
pub mod ledger;
pub mod log;
pub mod rules;
pub mod stack;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    Age, Command, CommandRecord, GameRng, GameSetup, GameState, IdentityShuffle, Phase, Player,
    PlayerId, PlayerMap, PlayerSetup, RulesConfig, ShuffleProvider, Slot, SLOT_COUNT,
};

pub use crate::cards::{CardDefinition, CardId, CardRegistry};

pub use crate::catalog::Catalog;

pub use crate::choice::{Answer, ChoiceBroker, ChoiceKind, ChoiceOptions, PendingChoice, PerpetualRef};

pub use crate::effects::{
    AgeRule, Amount, CardRef, ChoiceBranch, Condition, DiscardSelector, EffectResolver, EffectScript,
    EffectSource, OpponentFilter, ResolutionContext, Step, SubEffect, ZoneRule,
};

pub use crate::error::{EngineError, Result};

pub use crate::ledger::{CrownLedger, Economy, Payment, ScoreTrack, Shortfall};

pub use crate::log::{GameLog, LogCategory, LogEntry, Verbosity};

pub use crate::rules::{Game, RulesEngine};

pub use crate::stack::{ResolutionStack, ResolutionStatus};

pub use crate::triggers::{PerpetualTriggerBus, TriggerCategory, TriggerScope};

pub use crate::zones::{RebindReason, RebindRecord, ZoneDefId, ZoneDefinition, ZoneRegistry, ZoneTable};
