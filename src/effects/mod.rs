//! Effect system: scripts as data and the interpreter that runs them.
//!
//! - [`Step`] / [`EffectScript`]: the closed step set and step lists
//! - targeting selectors ([`AgeRule`], [`ZoneRule`], [`OpponentFilter`],
//!   [`DiscardSelector`], [`CardRef`])
//! - [`ResolutionContext`]: actor, source, bound card and counters
//! - [`EffectResolver`]: executes frames off the resolution stack,
//!   suspending at prompts
//!
//! ## Design Philosophy
//!
//! A card that copies another card's effect, or replays a perpetual,
//! just names the other script; there is one interpreter and no
//! per-card code.

mod context;
mod effect;
mod resolver;
mod targeting;

pub use context::{BoundCard, EffectSource, ResolutionContext};
pub use effect::{Amount, ChoiceBranch, Condition, EffectScript, Step, SubEffect};
pub use resolver::{EffectResolver, StepOutcome};
pub use targeting::{AgeRule, CardRef, DiscardSelector, OpponentFilter, ZoneRule};
