//! Perpetual trigger system.
//!
//! A perpetual is a card parked in a player's perpetual area under one
//! [`TriggerCategory`]. Whenever a lifecycle point of that category is
//! reached, its reactive script runs once per copy held.
//!
//! ## Key Components
//!
//! - [`TriggerCategory`]: The closed set of lifecycle points, in firing order
//! - [`TriggerScope`]: Whose perpetuals a category consults
//! - [`PerpetualTriggerBus`]: Snapshots firings and hands them to the run loop
//!
//! ## Re-entrancy
//!
//! Events raised while a perpetual resolves fire immediately, depth-first,
//! unless the same `(category, player)` pair is already dispatching.

mod bus;
mod category;

pub use bus::PerpetualTriggerBus;
pub use category::{TriggerCategory, TriggerScope};
