//! Core engine types: board geometry, players, state, commands, RNG,
//! configuration.
//!
//! Everything else in the crate reads and writes through [`GameState`];
//! drivers talk to it through [`Command`]s.

pub mod action;
pub mod board;
pub mod config;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Command, CommandRecord};
pub use board::{Age, Slot, SLOT_COUNT};
pub use config::{GameSetup, PlayerSetup, RulesConfig};
pub use player::{Player, PlayerId, PlayerMap};
pub use rng::{GameRng, IdentityShuffle, ShuffleProvider};
pub use state::{GameState, Phase};
