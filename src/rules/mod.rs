//! Turn engine and driver interface.
//!
//! - [`Game`]: phases, actions, command validation and rollback, queries
//! - [`RulesEngine`]: the minimal surface scripted drivers program against
//!
//! The engine never interprets card text directly; it schedules scripts
//! on the resolution stack and lets [`crate::effects::EffectResolver`]
//! run them.

pub mod engine;
pub mod game;

pub use engine::RulesEngine;
pub use game::Game;
