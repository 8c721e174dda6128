//! Structured game log.
//!
//! Every command, effect step, prompt and perpetual firing appends a
//! [`LogEntry`] to the [`GameLog`] held on the game state. Entries above
//! the configured [`Verbosity`] are dropped at the call site, before the
//! message is formatted. The log is an `im::Vector`, so it is snapshotted
//! and rolled back together with the rest of the state.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// How much detail the log keeps.
///
/// Ordered: a level records everything at or below itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Verbosity {
    /// Record nothing.
    Silent = 0,
    /// Turn boundaries and commands.
    Minimal = 1,
    /// Effects, prompts and answers.
    #[default]
    Normal = 2,
    /// Every step and perpetual firing, including skips.
    Verbose = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogCategory {
    Turn,
    Command,
    Effect,
    Choice,
    Trigger,
    Zone,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub turn: u32,
    pub player: Option<PlayerId>,
    pub level: Verbosity,
    pub category: LogCategory,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLog {
    verbosity: Verbosity,
    entries: Vector<LogEntry>,
}

impl GameLog {
    #[must_use]
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            entries: Vector::new(),
        }
    }

    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Whether an entry at `level` would be kept.
    #[must_use]
    pub fn enabled(&self, level: Verbosity) -> bool {
        level != Verbosity::Silent && level <= self.verbosity
    }

    /// Append an entry. `message` is only evaluated when the level is enabled.
    pub fn record(
        &mut self,
        level: Verbosity,
        category: LogCategory,
        turn: u32,
        player: Option<PlayerId>,
        message: impl FnOnce() -> String,
    ) {
        if !self.enabled(level) {
            return;
        }
        self.entries.push_back(LogEntry {
            turn,
            player,
            level,
            category,
            message: message(),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &Vector<LogEntry> {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Entries of one category, oldest first.
    pub fn by_category(&self, category: LogCategory) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry, keeping the verbosity.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
