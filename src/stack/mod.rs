//! The resolution stack.
//!
//! All pending work lives here as explicit [`Task`]s rather than on the
//! native call stack, so a suspended chain of any depth (a prompt inside
//! a perpetual inside a copied effect) can be inspected, cloned with the
//! state and serialized. The top of the stack is the back of the vector.
//!
//! - [`Task::Run`]: a [`Frame`] executing an effect script
//! - [`Task::Fire`]: a perpetual [`Dispatch`] still handing out firings
//! - [`Task::Settle`]: send a played card to the discard pile unless claimed
//!
//! ```
//! use temporum_engine::cards::CardId;
//! use temporum_engine::core::PlayerId;
//! use temporum_engine::stack::{ResolutionStack, Task};
//!
//! let mut stack = ResolutionStack::new();
//! stack.push(Task::Settle { player: PlayerId::new(0), card: CardId::new(1) });
//! assert_eq!(stack.len(), 1);
//! assert!(stack.top_frame_mut().is_none());
//! ```

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::choice::{Answer, ChoiceKind, PerpetualRef};
use crate::core::PlayerId;
use crate::effects::{ResolutionContext, Step};
use crate::triggers::TriggerCategory;

/// Status returned by every engine entry point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionStatus {
    /// Nothing left to resolve.
    Complete,
    /// Stopped at a prompt; the named player must answer.
    AwaitingChoice { player: PlayerId, kind: ChoiceKind },
}

impl ResolutionStatus {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, ResolutionStatus::Complete)
    }
}

/// A script being executed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub steps: Vec<Step>,
    /// Index of the next step.
    pub pc: usize,
    pub ctx: ResolutionContext,
    /// Answer waiting for the current step, set by the choice broker.
    pub answer: Option<Answer>,
    /// First-stage answer of a two-prompt step.
    pub scratch: Option<PerpetualRef>,
    /// Set on perpetual firings: the dispatch this frame belongs to.
    pub trigger: Option<(TriggerCategory, PlayerId)>,
    /// How many frames started this one: 0 for a command's own scripts.
    pub depth: usize,
}

impl Frame {
    pub fn new(steps: impl Into<Vec<Step>>, ctx: ResolutionContext) -> Self {
        Self {
            steps: steps.into(),
            pc: 0,
            ctx,
            answer: None,
            scratch: None,
            trigger: None,
            depth: 0,
        }
    }

    #[must_use]
    pub fn triggered_by(mut self, category: TriggerCategory, owner: PlayerId) -> Self {
        self.trigger = Some((category, owner));
        self
    }

    #[must_use]
    pub fn current(&self) -> Option<&Step> {
        self.steps.get(self.pc)
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.pc >= self.steps.len()
    }

    #[must_use]
    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Insert `steps` to run right after the current one.
    pub fn splice_next(&mut self, steps: &[Step]) {
        let at = (self.pc + 1).min(self.steps.len());
        self.steps.splice(at..at, steps.iter().cloned());
    }
}

/// One perpetual due to fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firing {
    pub owner: PlayerId,
    pub card: CardId,
}

/// The firings of one category, snapshotted when the event was raised.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    pub category: TriggerCategory,
    pub firings: Vector<Firing>,
    /// Depth given to every frame this dispatch fires.
    pub depth: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    Run(Frame),
    Fire(Dispatch),
    Settle { player: PlayerId, card: CardId },
}

impl Task {
    /// Mark a task scheduled by a frame at `parent` depth.
    pub fn nest_under(&mut self, parent: usize) {
        match self {
            Task::Run(frame) => frame.depth = parent + 1,
            Task::Fire(dispatch) => dispatch.depth = parent + 1,
            Task::Settle { .. } => {}
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStack {
    tasks: Vector<Task>,
}

impl ResolutionStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    /// Push `tasks` so that the first one ends up on top.
    pub fn push_all(&mut self, tasks: Vec<Task>) {
        for task in tasks.into_iter().rev() {
            self.tasks.push_back(task);
        }
    }

    pub fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_back()
    }

    #[must_use]
    pub fn top(&self) -> Option<&Task> {
        self.tasks.back()
    }

    pub fn top_frame_mut(&mut self) -> Option<&mut Frame> {
        match self.tasks.back_mut() {
            Some(Task::Run(frame)) => Some(frame),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether some frame on the stack belongs to a `(category, owner)` dispatch.
    #[must_use]
    pub fn is_dispatching(&self, category: TriggerCategory, owner: PlayerId) -> bool {
        self.tasks.iter().any(|t| match t {
            Task::Run(frame) => frame.trigger == Some((category, owner)),
            _ => false,
        })
    }

    /// Tasks from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectSource;

    fn frame(steps: Vec<Step>) -> Frame {
        Frame::new(
            steps,
            ResolutionContext::new(PlayerId::new(0), EffectSource::Card(CardId::new(1))),
        )
    }

    #[test]
    fn test_push_all_keeps_first_on_top() {
        let mut stack = ResolutionStack::new();
        stack.push_all(vec![
            Task::Settle { player: PlayerId::new(0), card: CardId::new(1) },
            Task::Settle { player: PlayerId::new(0), card: CardId::new(2) },
        ]);
        assert_eq!(
            stack.pop(),
            Some(Task::Settle { player: PlayerId::new(0), card: CardId::new(1) })
        );
    }

    #[test]
    fn test_splice_next() {
        let mut f = frame(vec![Step::gain(1), Step::gain(2)]);
        f.splice_next(&[Step::gain(9)]);
        assert_eq!(f.steps, vec![Step::gain(1), Step::gain(9), Step::gain(2)]);

        f.pc = 3;
        assert!(f.is_done());
        assert!(f.current().is_none());
    }

    #[test]
    fn test_dispatch_tags() {
        let mut stack = ResolutionStack::new();
        stack.push(Task::Run(frame(vec![])));
        stack.push(Task::Run(
            frame(vec![]).triggered_by(TriggerCategory::Draw, PlayerId::new(1)),
        ));
        stack.push(Task::Settle { player: PlayerId::new(0), card: CardId::new(3) });

        assert!(stack.is_dispatching(TriggerCategory::Draw, PlayerId::new(1)));
        assert!(!stack.is_dispatching(TriggerCategory::Draw, PlayerId::new(0)));
        assert!(stack.top_frame_mut().is_none());
    }

    #[test]
    fn test_nested_tasks_sit_one_level_down() {
        let mut run = Task::Run(frame(vec![]).at_depth(3));
        run.nest_under(3);
        assert!(matches!(run, Task::Run(ref f) if f.depth == 4));

        let mut fire = Task::Fire(Dispatch {
            category: TriggerCategory::Draw,
            firings: Vector::new(),
            depth: 0,
        });
        fire.nest_under(0);
        assert!(matches!(fire, Task::Fire(ref d) if d.depth == 1));
    }
}
