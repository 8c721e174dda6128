//! Zone system: definitions and the slot table.
//!
//! ## Key Types
//!
//! - `ZoneDefId`: Opaque zone definition identifier
//! - `ZoneDefinition`: Name, Age, script and rebinding links
//! - `ZoneRegistry`: Definition lookup
//! - `ZoneTable`: Which definition each slot shows, hourglasses, rebind history

pub mod definition;
pub mod table;

pub use definition::{ZoneDefId, ZoneDefinition, ZoneRegistry};
pub use table::{RebindReason, RebindRecord, ZoneTable};
