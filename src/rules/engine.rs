//! Driver-facing engine trait.
//!
//! Scripted drivers (fixture runners, random testers, AI players) only
//! need three things from an engine: what they may do, a way to do it,
//! and whether the game is still running.

use crate::core::Command;
use crate::error::Result;
use crate::stack::ResolutionStatus;

/// A command-driven rules engine.
///
/// ## Implementation Notes
///
/// - `legal_commands`: representative, not exhaustive; multi-card answers
///   are offered as single picks plus the minimal selection
/// - `apply`: must leave the state untouched when it returns an error
/// - `is_finished`: no command is legal once it returns true
pub trait RulesEngine {
    /// Commands the engine would accept right now.
    fn legal_commands(&self) -> Vec<Command>;

    /// Apply one command.
    fn apply(&mut self, command: Command) -> Result<ResolutionStatus>;

    /// Whether the driver has stopped the game.
    fn is_finished(&self) -> bool;

    // === Convenience Methods ===

    /// Apply the first legal command, if any.
    ///
    /// Handy for driving a game to a quiet point in tests.
    fn apply_first_legal(&mut self) -> Option<Result<ResolutionStatus>> {
        let command = self.legal_commands().into_iter().next()?;
        Some(self.apply(command))
    }
}
