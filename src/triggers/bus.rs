//! Perpetual dispatch.
//!
//! When an action or step raises a category, [`PerpetualTriggerBus::collect`]
//! snapshots the matching perpetuals into a [`Dispatch`] task. The run loop
//! later pulls firings off it one at a time with
//! [`PerpetualTriggerBus::next_firing`], so every copy of a perpetual runs
//! as its own frame and can prompt on its own.
//!
//! Two rules keep chains finite and deterministic:
//!
//! - a firing whose card is no longer held when it is reached is skipped
//! - a `(category, owner)` pair that is already dispatching on the stack
//!   is not raised again until that dispatch finishes

use im::Vector;

use super::category::{TriggerCategory, TriggerScope};
use crate::core::{GameState, PlayerId};
use crate::effects::{EffectSource, ResolutionContext};
use crate::error::Result;
use crate::log::{LogCategory, Verbosity};
use crate::stack::{Dispatch, Firing, Frame};

pub struct PerpetualTriggerBus;

impl PerpetualTriggerBus {
    /// Snapshot the firings `category` produces for an event by `actor`.
    ///
    /// `current` is the frame that raised the event, if it has already
    /// been taken off the stack. Returns `None` when nothing would fire.
    pub fn collect(
        state: &GameState,
        category: TriggerCategory,
        actor: PlayerId,
        current: Option<&Frame>,
    ) -> Option<Dispatch> {
        let owners = match category.scope() {
            TriggerScope::Actor => vec![actor],
            TriggerScope::AllPlayers => state.order_from(actor),
        };

        let firings: Vector<Firing> = owners
            .into_iter()
            .filter(|owner| !Self::is_suppressed(state, current, category, *owner))
            .flat_map(|owner| {
                state.players[owner]
                    .perpetuals_for(category)
                    .into_iter()
                    .map(move |card| Firing { owner, card })
            })
            .collect();

        if firings.is_empty() {
            None
        } else {
            Some(Dispatch {
                category,
                firings,
                depth: 0,
            })
        }
    }

    fn is_suppressed(
        state: &GameState,
        current: Option<&Frame>,
        category: TriggerCategory,
        owner: PlayerId,
    ) -> bool {
        state.stack.is_dispatching(category, owner)
            || current.is_some_and(|frame| frame.trigger == Some((category, owner)))
    }

    /// Take the next firing off `dispatch`. Returns the frame to run, or
    /// `None` when the firing's perpetual has been removed since the
    /// snapshot.
    pub fn next_firing(state: &mut GameState, dispatch: &mut Dispatch) -> Result<Option<Frame>> {
        let Some(firing) = dispatch.firings.pop_front() else {
            return Ok(None);
        };
        let category = dispatch.category;

        // Removed copies are taken from the front of the queue.
        let queued = 1 + dispatch.firings.iter().filter(|f| **f == firing).count();
        let held = state.players[firing.owner]
            .perpetuals_for(category)
            .iter()
            .filter(|c| **c == firing.card)
            .count();
        if held < queued {
            let name = state.card_name(firing.card);
            state.note(Verbosity::Verbose, LogCategory::Trigger, Some(firing.owner), || {
                format!("{} ({}) is gone, skipping", name, category)
            });
            return Ok(None);
        }

        let steps = state.catalog.cards().require(firing.card)?.reactive.steps().to_vec();
        let name = state.card_name(firing.card);
        state.note(Verbosity::Normal, LogCategory::Trigger, Some(firing.owner), || {
            format!("{} fires on {} for {}", name, category, firing.owner)
        });

        let ctx = ResolutionContext::new(firing.owner, EffectSource::Perpetual(firing.card));
        Ok(Some(
            Frame::new(steps, ctx)
                .triggered_by(category, firing.owner)
                .at_depth(dispatch.depth),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::standard::{ARTIST, CHRONICLER, GANG_OF_PICKPOCKETS};
    use crate::catalog::Catalog;
    use crate::core::{GameSetup, IdentityShuffle, PlayerSetup};
    use crate::stack::Task;

    fn state() -> GameState {
        let setup = GameSetup::new(3)
            .with_player(
                0,
                PlayerSetup::new()
                    .with_hand([])
                    .with_perpetual(TriggerCategory::Visit, CHRONICLER)
                    .with_perpetual(TriggerCategory::PostPlay, GANG_OF_PICKPOCKETS)
                    .with_perpetual(TriggerCategory::PostPlay, GANG_OF_PICKPOCKETS),
            )
            .with_player(1, PlayerSetup::new().with_hand([]))
            .with_player(
                2,
                PlayerSetup::new()
                    .with_hand([])
                    .with_perpetual(TriggerCategory::Visit, ARTIST),
            )
            .with_deck([]);
        GameState::from_setup(
            Arc::new(Catalog::standard().unwrap()),
            setup,
            Box::new(IdentityShuffle),
        )
        .unwrap()
    }

    #[test]
    fn test_actor_scope_and_copies() {
        let s = state();
        let dispatch =
            PerpetualTriggerBus::collect(&s, TriggerCategory::PostPlay, PlayerId::new(0), None).unwrap();
        assert_eq!(dispatch.firings.len(), 2);
        assert!(PerpetualTriggerBus::collect(&s, TriggerCategory::PostPlay, PlayerId::new(1), None).is_none());
    }

    #[test]
    fn test_visit_fires_for_everyone_actor_first() {
        let s = state();
        let dispatch =
            PerpetualTriggerBus::collect(&s, TriggerCategory::Visit, PlayerId::new(2), None).unwrap();
        let owners: Vec<_> = dispatch.firings.iter().map(|f| f.owner).collect();
        assert_eq!(owners, vec![PlayerId::new(2), PlayerId::new(0)]);
    }

    #[test]
    fn test_suppression() {
        let mut s = state();
        let running = Frame::new(
            Vec::new(),
            ResolutionContext::new(PlayerId::new(0), EffectSource::Perpetual(GANG_OF_PICKPOCKETS)),
        )
        .triggered_by(TriggerCategory::PostPlay, PlayerId::new(0));

        assert!(PerpetualTriggerBus::collect(
            &s,
            TriggerCategory::PostPlay,
            PlayerId::new(0),
            Some(&running)
        )
        .is_none());

        s.stack.push(Task::Run(running));
        assert!(
            PerpetualTriggerBus::collect(&s, TriggerCategory::PostPlay, PlayerId::new(0), None).is_none()
        );
    }

    #[test]
    fn test_removed_copy_is_skipped() {
        let mut s = state();
        let mut dispatch =
            PerpetualTriggerBus::collect(&s, TriggerCategory::PostPlay, PlayerId::new(0), None).unwrap();

        s.player_mut(PlayerId::new(0))
            .remove_perpetual(GANG_OF_PICKPOCKETS, None);

        assert!(PerpetualTriggerBus::next_firing(&mut s, &mut dispatch).unwrap().is_none());
        let frame = PerpetualTriggerBus::next_firing(&mut s, &mut dispatch).unwrap().unwrap();
        assert_eq!(frame.ctx.source, EffectSource::Perpetual(GANG_OF_PICKPOCKETS));
        assert_eq!(frame.trigger, Some((TriggerCategory::PostPlay, PlayerId::new(0))));
        assert!(dispatch.firings.is_empty());
    }
}
