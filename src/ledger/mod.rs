//! Crown ledger and coin economy.
//!
//! - [`ScoreTrack`]: one player's crowns per Age
//! - [`CrownLedger`]: ruling queries across players
//! - [`Economy`]: coin gains and checked payments

mod coins;
mod crowns;

pub use coins::{Economy, Payment, Shortfall};
pub use crowns::{CrownLedger, ScoreTrack};
