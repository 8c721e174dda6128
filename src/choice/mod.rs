//! Player decisions: pending choices, answers and the broker that
//! validates one against the other.

mod broker;

pub use broker::{Answer, ChoiceBroker, ChoiceKind, ChoiceOptions, PendingChoice, PerpetualRef};
