//! Card system: definitions and registry.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `CardDefinition`: Name plus play/score/perpetual effect scripts
//! - `CardRegistry`: Card definition lookup

pub mod definition;
pub mod registry;

pub use definition::{CardDefinition, CardId};
pub use registry::CardRegistry;
