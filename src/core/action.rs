//! Driver commands.
//!
//! A [`Command`] is one discrete decision from a driver (scripted AI or
//! UI). Action commands start new work (visit, play, score, end turn);
//! answer commands resume an open prompt. Typed answer commands
//! (`DiscardMany`, `Move`, `AdvanceCrown`, ...) are shorthands that the
//! choice broker translates to an [`Answer`].

use serde::{Deserialize, Serialize};

use super::board::{Age, Slot};
use super::player::PlayerId;
use crate::choice::Answer;

/// A complete driver command.
///
/// ## Example
///
/// ```
/// use temporum_engine::core::{Command, Slot};
///
/// let visit = Command::VisitZone(Slot(6));
/// assert!(visit.is_action());
/// assert!(!Command::Choose(0).is_action());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    // === Actions ===
    VisitZone(Slot),
    /// Play the hand card at this index. Also answers play/copy prompts.
    PlayCard(usize),
    ScoreCard(usize),
    EndTurn,

    // === Answers ===
    DiscardMany(Vec<usize>),
    DiscardAndContinue(usize),
    PassCard(usize),
    Move(Slot),
    AdvanceCrown(Age),
    RetreatCrown(Age),
    /// Pick option `i` of whatever prompt is open.
    Choose(usize),
    SubmitChoice(Answer),
    ChangeHistory(Slot),
    DeclineChangeHistory,
}

impl Command {
    /// Whether the command starts new work rather than answering a prompt.
    ///
    /// `PlayCard` counts as an action; while a prompt is open it is
    /// treated as an answer instead.
    #[must_use]
    pub fn is_action(&self) -> bool {
        matches!(
            self,
            Command::VisitZone(_) | Command::PlayCard(_) | Command::ScoreCard(_) | Command::EndTurn
        )
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::VisitZone(slot) => write!(f, "visit {}", slot),
            Command::PlayCard(i) => write!(f, "play card {}", i),
            Command::ScoreCard(i) => write!(f, "score card {}", i),
            Command::EndTurn => f.write_str("end turn"),
            Command::DiscardMany(cards) => write!(f, "discard {:?}", cards),
            Command::DiscardAndContinue(i) => write!(f, "discard card {}", i),
            Command::PassCard(i) => write!(f, "pass card {}", i),
            Command::Move(slot) => write!(f, "move to {}", slot),
            Command::AdvanceCrown(age) => write!(f, "advance crown in {}", age),
            Command::RetreatCrown(age) => write!(f, "retreat crown in {}", age),
            Command::Choose(i) => write!(f, "choose option {}", i),
            Command::SubmitChoice(answer) => write!(f, "answer {:?}", answer),
            Command::ChangeHistory(slot) => write!(f, "change history at {}", slot),
            Command::DeclineChangeHistory => f.write_str("decline change history"),
        }
    }
}

/// A recorded command with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// The player the command was accepted from.
    pub player: PlayerId,
    pub command: Command,
    /// Turn number when the command was accepted.
    pub turn: u32,
    /// Sequence number within the game.
    pub sequence: u32,
}

impl CommandRecord {
    #[must_use]
    pub fn new(player: PlayerId, command: Command, turn: u32, sequence: u32) -> Self {
        Self {
            player,
            command,
            turn,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_classification() {
        assert!(Command::PlayCard(0).is_action());
        assert!(Command::EndTurn.is_action());
        assert!(!Command::DiscardMany(vec![]).is_action());
        assert!(!Command::SubmitChoice(Answer::Decline).is_action());
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::VisitZone(Slot(6)).to_string(), "visit Slot(6)");
        assert_eq!(Command::AdvanceCrown(Age::II).to_string(), "advance crown in Age II");
    }

    #[test]
    fn test_record() {
        let record = CommandRecord::new(PlayerId::new(1), Command::EndTurn, 4, 17);
        assert_eq!(record.player, PlayerId::new(1));
        assert_eq!(record.sequence, 17);
    }
}
