//! Effect resolution: the interpreter and its run loop.
//!
//! [`EffectResolver::run`] pops tasks off the resolution stack until it is
//! empty or a step opens a prompt. Executing one step yields a
//! [`StepOutcome`]:
//!
//! - `Continue(children)`: advance the frame, then run `children` first
//! - `Suspend(choice)`: keep the frame on top and wait for an answer
//! - `Halt`: drop the rest of the frame's script
//!
//! A suspended step is executed again once the choice broker has left an
//! answer on its frame, so every prompting step has an "ask" arm and an
//! "answered" arm.

use smallvec::SmallVec;

use super::context::{BoundCard, EffectSource, ResolutionContext};
use super::effect::{Amount, Condition, EffectScript, Step, SubEffect};
use super::targeting::{AgeRule, CardRef, DiscardSelector, ZoneRule};
use crate::cards::CardId;
use crate::choice::{Answer, ChoiceBroker, ChoiceKind, ChoiceOptions, PendingChoice, PerpetualRef};
use crate::core::{Age, GameState, PlayerId, Slot};
use crate::error::{EngineError, Result};
use crate::ledger::{CrownLedger, Economy, Payment};
use crate::log::{LogCategory, Verbosity};
use crate::stack::{Frame, ResolutionStatus, Task};
use crate::triggers::{PerpetualTriggerBus, TriggerCategory};
use crate::zones::{RebindReason, ZoneDefId};

/// What executing one step asks the run loop to do next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Continue(Vec<Task>),
    Suspend(PendingChoice),
    Halt,
}

impl StepOutcome {
    fn done() -> Self {
        StepOutcome::Continue(Vec::new())
    }
}

/// Executes effect scripts against the game state.
pub struct EffectResolver;

impl EffectResolver {
    /// Push `script` as a new frame and run until complete or suspended.
    pub fn resolve(
        state: &mut GameState,
        script: &EffectScript,
        context: ResolutionContext,
    ) -> Result<ResolutionStatus> {
        if state.pending.is_some() {
            return Err(EngineError::illegal("a choice is already open"));
        }
        state.stack.push(Task::Run(Frame::new(script.steps().to_vec(), context)));
        Self::run(state)
    }

    /// Continue whatever is on the stack.
    pub fn run(state: &mut GameState) -> Result<ResolutionStatus> {
        loop {
            if let Some(choice) = &state.pending {
                return Ok(ResolutionStatus::AwaitingChoice {
                    player: choice.player,
                    kind: choice.kind,
                });
            }
            let Some(task) = state.stack.pop() else {
                return Ok(ResolutionStatus::Complete);
            };
            match task {
                Task::Run(frame) => Self::step(state, frame)?,
                Task::Fire(mut dispatch) => {
                    let frame = PerpetualTriggerBus::next_firing(state, &mut dispatch)?;
                    if !dispatch.firings.is_empty() {
                        state.stack.push(Task::Fire(dispatch));
                    }
                    if let Some(frame) = frame {
                        Self::check_depth(state, frame.depth)?;
                        state.stack.push(Task::Run(frame));
                    }
                }
                Task::Settle { player, card } => Self::settle(state, player, card),
            }
        }
    }

    fn step(state: &mut GameState, mut frame: Frame) -> Result<()> {
        let Some(step) = frame.current().cloned() else {
            return Ok(());
        };
        match Self::execute(state, &mut frame, &step)? {
            StepOutcome::Continue(mut children) => {
                for child in &mut children {
                    child.nest_under(frame.depth);
                }
                if !children.is_empty() {
                    Self::check_depth(state, frame.depth + 1)?;
                }
                frame.pc += 1;
                frame.answer = None;
                frame.scratch = None;
                // Finished frames stay until popped so their dispatch tag
                // still suppresses re-entry while their children run.
                state.stack.push(Task::Run(frame));
                state.stack.push_all(children);
            }
            StepOutcome::Suspend(choice) => {
                state.stack.push(Task::Run(frame));
                ChoiceBroker::request(state, choice);
            }
            StepOutcome::Halt => {
                let actor = frame.ctx.actor;
                state.note(Verbosity::Verbose, LogCategory::Effect, Some(actor), || {
                    "Rest of the script skipped".to_string()
                });
            }
        }
        Ok(())
    }

    /// Siblings share a depth; only frames started from frames go deeper.
    fn check_depth(state: &GameState, depth: usize) -> Result<()> {
        let limit = state.rules.max_chain_depth;
        if depth > limit {
            Err(EngineError::ChainDepthExceeded(limit))
        } else {
            Ok(())
        }
    }

    /// A played or scored card that nothing claimed goes to the discard pile.
    fn settle(state: &mut GameState, player: PlayerId, card: CardId) {
        if let Some(pos) = last_index_of(&state.in_play, card) {
            state.in_play.remove(pos);
            state.discard.push_back(card);
            let name = state.card_name(card);
            state.note(Verbosity::Verbose, LogCategory::Effect, Some(player), || {
                format!("{} goes to the discard pile", name)
            });
        }
    }

    // === Scheduling ===

    /// Tasks for playing `card` (already moved to the in-play area):
    /// play perpetuals, the play script `times` times, settle, postPlay
    /// perpetuals. Dispatches are snapshotted now.
    pub fn play_tasks(
        state: &GameState,
        player: PlayerId,
        card: CardId,
        times: u8,
        current: Option<&Frame>,
    ) -> Result<Vec<Task>> {
        let script = state.catalog.cards().require(card)?.play.steps().to_vec();
        let mut tasks: Vec<Task> =
            Self::raise_with(state, TriggerCategory::Play, player, current).into_iter().collect();
        for _ in 0..times {
            let ctx = ResolutionContext::new(player, EffectSource::Card(card));
            tasks.push(Task::Run(Frame::new(script.clone(), ctx)));
        }
        tasks.push(Task::Settle { player, card });
        tasks.extend(Self::raise_with(state, TriggerCategory::PostPlay, player, current));
        Ok(tasks)
    }

    /// Tasks for scoring `card` (already moved to the in-play area).
    pub fn score_tasks(state: &GameState, player: PlayerId, card: CardId) -> Result<Vec<Task>> {
        let def = state.catalog.cards().require(card)?;
        let script = def
            .score
            .as_ref()
            .ok_or_else(|| EngineError::illegal(format!("{} cannot be scored", def.name)))?
            .steps()
            .to_vec();
        let mut tasks: Vec<Task> =
            Self::raise_with(state, TriggerCategory::Score, player, None).into_iter().collect();
        let ctx = ResolutionContext::new(player, EffectSource::Card(card));
        tasks.push(Task::Run(Frame::new(script, ctx)));
        tasks.push(Task::Settle { player, card });
        tasks.extend(Self::raise_with(state, TriggerCategory::PostScore, player, None));
        Ok(tasks)
    }

    /// Snapshot a dispatch for `category` as a task, if anything would fire.
    pub fn raise_with(
        state: &GameState,
        category: TriggerCategory,
        actor: PlayerId,
        current: Option<&Frame>,
    ) -> Option<Task> {
        PerpetualTriggerBus::collect(state, category, actor, current).map(Task::Fire)
    }

    fn raise(state: &GameState, category: TriggerCategory, frame: &Frame) -> Vec<Task> {
        Self::raise_with(state, category, frame.ctx.actor, Some(frame))
            .into_iter()
            .collect()
    }

    // === Step execution ===

    fn execute(state: &mut GameState, frame: &mut Frame, step: &Step) -> Result<StepOutcome> {
        let actor = frame.ctx.actor;
        let answer = frame.answer.take();

        match step {
            Step::GainCoins(amount) => {
                let n = Self::amount(state, &frame.ctx, *amount)?;
                Economy::gain(&mut state.player_mut(actor).coins, n);
                state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
                    format!("{} gains {} coins", actor, n)
                });
                Ok(StepOutcome::done())
            }

            Step::LoseCoins { amount, shortfall } => {
                let n = Self::amount(state, &frame.ctx, *amount)?;
                let payment = Economy::pay(&mut state.player_mut(actor).coins, n, *shortfall);
                state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
                    format!("{} pays {} coins: {:?}", actor, n, payment)
                });
                Ok(match payment {
                    Payment::Abort => StepOutcome::Halt,
                    Payment::Paid(_) | Payment::Partial(_) | Payment::Skipped => StepOutcome::done(),
                })
            }

            Step::DrawCards(amount) => {
                let n = Self::amount(state, &frame.ctx, *amount)?;
                let drawn = state.draw(actor, n);
                frame.ctx.drawn += drawn;
                state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
                    format!("{} draws {} of {} cards", actor, drawn, n)
                });
                if drawn == 0 {
                    return Ok(StepOutcome::done());
                }
                Ok(StepOutcome::Continue(Self::raise(state, TriggerCategory::Draw, frame)))
            }

            Step::DiscardCards(selector) => Self::discard(state, frame, *selector, answer),

            Step::MoveToZone(rule) => {
                let target = match (rule, answer) {
                    (ZoneRule::Slot(slot), _) => Some(*slot),
                    (ZoneRule::Forward, _) => Some(state.players[actor].zone.forward()),
                    (ZoneRule::Choose { .. }, Some(Answer::Slot(slot))) => Some(slot),
                    (ZoneRule::Choose { .. }, Some(_)) => None,
                    (ZoneRule::Choose { optional }, None) => {
                        let here = state.players[actor].zone;
                        let slots: SmallVec<[Slot; 4]> = Slot::all().filter(|s| *s != here).collect();
                        let prompt = Self::prompt(state, &frame.ctx, "move your traveller");
                        return Ok(StepOutcome::Suspend(
                            PendingChoice::single(
                                ChoiceKind::Move,
                                actor,
                                prompt,
                                ChoiceOptions::Slots(slots),
                                frame.ctx.source,
                            )
                            .declinable(*optional),
                        ));
                    }
                };
                if let Some(slot) = target.filter(|s| s.is_valid()) {
                    state.player_mut(actor).zone = slot;
                    state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
                        format!("{} moves to {}", actor, slot)
                    });
                }
                Ok(StepOutcome::done())
            }

            Step::AdvanceCrown(rule) => {
                let age = match Self::age(state, frame, *rule, answer, ChoiceKind::AdvanceCrown) {
                    Ok(age) => age,
                    Err(outcome) => return Ok(outcome),
                };
                let moved = state.player_mut(actor).score_track.advance(age);
                state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || match moved {
                    Some(from) => format!("{} advances a crown from {} to {}", actor, from, age),
                    None => format!("{} cannot advance a crown into {}", actor, age),
                });
                if moved.is_some() {
                    Ok(StepOutcome::Continue(Self::raise(state, TriggerCategory::Advance, frame)))
                } else {
                    Ok(StepOutcome::done())
                }
            }

            Step::RetreatCrown(rule) => {
                let age = match Self::age(state, frame, *rule, answer, ChoiceKind::RetreatCrown) {
                    Ok(age) => age,
                    Err(outcome) => return Ok(outcome),
                };
                let moved = state.player_mut(actor).score_track.retreat(age);
                state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || match moved {
                    Some(to) => format!("{} retreats a crown from {} to {}", actor, age, to),
                    None => format!("{} cannot retreat a crown from {}", actor, age),
                });
                Ok(StepOutcome::done())
            }

            Step::AddPerpetual { card, category } => {
                Self::add_perpetual(state, frame, *card, *category, answer)
            }

            Step::RemovePerpetual { card, category } => {
                Self::remove_perpetual(state, frame, *card, *category, answer)
            }

            Step::ConditionalChoice {
                prompt,
                branches,
                declinable,
            } => match answer {
                Some(Answer::Option(i)) => {
                    let branch = branches
                        .get(i)
                        .ok_or_else(|| EngineError::script(format!("no branch {}", i)))?;
                    let label = branch.label.clone();
                    frame.splice_next(&branch.steps);
                    state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
                        format!("{} chose '{}'", actor, label)
                    });
                    Ok(StepOutcome::done())
                }
                Some(_) => Ok(StepOutcome::done()),
                None if branches.is_empty() => Ok(StepOutcome::done()),
                None => {
                    let labels = branches.iter().map(|b| b.label.clone()).collect();
                    Ok(StepOutcome::Suspend(
                        PendingChoice::single(
                            ChoiceKind::Branch,
                            actor,
                            prompt.clone(),
                            ChoiceOptions::Labels(labels),
                            frame.ctx.source,
                        )
                        .declinable(*declinable),
                    ))
                }
            },

            Step::SubEffect(sub) => Self::sub_effect(state, frame, *sub, answer),

            Step::If {
                condition,
                then,
                otherwise,
            } => {
                let holds = Self::condition(state, &frame.ctx, condition)?;
                frame.splice_next(if holds { then } else { otherwise });
                state.note(Verbosity::Verbose, LogCategory::Effect, Some(actor), || {
                    format!("condition {:?} is {}", condition, holds)
                });
                Ok(StepOutcome::done())
            }

            Step::PlayFromHand { times } => {
                let index = match answer {
                    Some(Answer::Cards(cards)) => cards.first().copied(),
                    Some(_) => None,
                    None => {
                        let bound = frame
                            .ctx
                            .bound
                            .and_then(|b| state.locate_in_hand(actor, b.index, b.card));
                        match bound {
                            Some(index) => Some(index),
                            None => {
                                return Ok(Self::ask_hand_card(
                                    state,
                                    frame,
                                    ChoiceKind::PlayCard,
                                    "choose a card to play",
                                ))
                            }
                        }
                    }
                };
                let Some(index) = index else {
                    return Ok(StepOutcome::done());
                };
                let card = state.take_from_hand(actor, index)?;
                state.in_play.push_back(card);
                let name = state.card_name(card);
                state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
                    format!("{} plays {} x{}", actor, name, times)
                });
                Ok(StepOutcome::Continue(Self::play_tasks(
                    state,
                    actor,
                    card,
                    *times,
                    Some(&*frame),
                )?))
            }

            Step::PassCard => match answer {
                Some(Answer::Cards(cards)) => {
                    if let Some(index) = cards.first() {
                        let card = state.take_from_hand(actor, *index)?;
                        let to = state.next_player(actor);
                        state.player_mut(to).hand.push_back(card);
                        state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
                            format!("{} passes a card to {}", actor, to)
                        });
                    }
                    Ok(StepOutcome::done())
                }
                Some(_) => Ok(StepOutcome::done()),
                None => Ok(Self::ask_hand_card(
                    state,
                    frame,
                    ChoiceKind::PassCard,
                    "choose a card to pass",
                )),
            },

            Step::GrantActions(n) => {
                state.actions_remaining += n;
                state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
                    format!("{} more actions this turn", n)
                });
                Ok(StepOutcome::done())
            }

            Step::ExtraTurn => {
                state.extra_turns += 1;
                state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
                    "Extra turn granted".to_string()
                });
                Ok(StepOutcome::done())
            }

            Step::ForEachOpponent { filter, steps } => {
                let here = state.players[actor].zone;
                let mut children = Vec::new();
                for opponent in state.order_from(actor).into_iter().skip(1) {
                    if filter.matches(here, state.players[opponent].zone)? {
                        let ctx = frame.ctx.for_actor(opponent);
                        children.push(Task::Run(Frame::new(steps.clone(), ctx)));
                    }
                }
                Ok(StepOutcome::Continue(children))
            }

            Step::TickHourglass => {
                let slot = Self::own_zone(&frame.ctx, "TickHourglass")?;
                let value = state.zones.tick(slot);
                state.note(Verbosity::Normal, LogCategory::Zone, Some(actor), || {
                    format!("Hourglass at {} is now {}", slot, value)
                });
                Ok(StepOutcome::done())
            }

            Step::ResetHourglass => {
                let slot = Self::own_zone(&frame.ctx, "ResetHourglass")?;
                state.zones.reset(slot);
                Ok(StepOutcome::done())
            }

            Step::BecomeReal => {
                let slot = Self::own_zone(&frame.ctx, "BecomeReal")?;
                let real = state.zone_definition(slot).and_then(|def| def.real);
                if let Some(real) = real {
                    Self::rebind(state, slot, real, RebindReason::BecameReal)?;
                }
                Ok(StepOutcome::done())
            }

            Step::ChangeHistory => match answer {
                Some(Answer::Slot(slot)) => {
                    let alternate = state.zone_definition(slot).and_then(|def| def.alternate);
                    if let Some(alternate) = alternate {
                        Self::rebind(state, slot, alternate, RebindReason::ChangedHistory)?;
                    }
                    Ok(StepOutcome::done())
                }
                Some(_) => Ok(StepOutcome::done()),
                None => {
                    let slots: SmallVec<[Slot; 4]> = Slot::all()
                        .filter(|s| state.zone_definition(*s).is_some_and(|d| d.alternate.is_some()))
                        .collect();
                    if slots.is_empty() {
                        return Ok(StepOutcome::done());
                    }
                    let prompt = Self::prompt(state, &frame.ctx, "change history at a zone");
                    Ok(StepOutcome::Suspend(
                        PendingChoice::single(
                            ChoiceKind::ChangeHistory,
                            actor,
                            prompt,
                            ChoiceOptions::Slots(slots),
                            frame.ctx.source,
                        )
                        .declinable(true),
                    ))
                }
            },

            Step::PlaceBase => {
                let slot = state.players[actor].zone;
                let capacity = state.zone_definition(slot).map_or(0, |d| d.base_capacity);
                let used = state
                    .players
                    .iter()
                    .filter(|(_, p)| p.bases.contains(&slot))
                    .count();
                let player = state.player_mut(actor);
                if !player.bases.contains(&slot) && used < usize::from(capacity) {
                    player.bases.insert(slot);
                    state.note(Verbosity::Normal, LogCategory::Zone, Some(actor), || {
                        format!("{} builds a base at {}", actor, slot)
                    });
                }
                Ok(StepOutcome::done())
            }

            Step::PlaceHq => {
                let slot = state.players[actor].zone;
                let allowed = state.zone_definition(slot).is_some_and(|d| d.hq_allowed);
                let taken = state
                    .players
                    .iter()
                    .any(|(id, p)| id != actor && p.hq == Some(slot));
                if allowed && !taken {
                    state.player_mut(actor).hq = Some(slot);
                    state.note(Verbosity::Normal, LogCategory::Zone, Some(actor), || {
                        format!("{} moves its HQ to {}", actor, slot)
                    });
                }
                Ok(StepOutcome::done())
            }
        }
    }

    fn discard(
        state: &mut GameState,
        frame: &mut Frame,
        selector: DiscardSelector,
        answer: Option<Answer>,
    ) -> Result<StepOutcome> {
        let actor = frame.ctx.actor;
        let hand_size = state.players[actor].hand.len();

        let indices: Vec<usize> = match (selector, answer) {
            (_, Some(Answer::Cards(cards))) => cards,
            (_, Some(_)) => Vec::new(),
            _ if hand_size == 0 => Vec::new(),
            (DiscardSelector::All, None) => (0..hand_size).collect(),
            (DiscardSelector::One { .. }, None) if frame.ctx.bound.is_some() => frame
                .ctx
                .bound
                .and_then(|b| state.locate_in_hand(actor, b.index, b.card))
                .into_iter()
                .collect(),
            (selector, None) => {
                let (min, max) = selector.bounds(hand_size);
                if max == 0 {
                    return Ok(StepOutcome::done());
                }
                let prompt = Self::prompt(state, &frame.ctx, "choose cards to discard");
                return Ok(StepOutcome::Suspend(
                    PendingChoice::single(
                        ChoiceKind::Discard,
                        actor,
                        prompt,
                        ChoiceOptions::HandCards((0..hand_size).collect()),
                        frame.ctx.source,
                    )
                    .with_bounds(min, max)
                    .declinable(min == 0),
                ));
            }
        };

        let count = state.discard_from_hand(actor, &indices)?;
        frame.ctx.discarded += count;
        state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
            format!("{} discards {} cards", actor, count)
        });
        Ok(StepOutcome::done())
    }

    fn add_perpetual(
        state: &mut GameState,
        frame: &mut Frame,
        card: CardRef,
        category: TriggerCategory,
        answer: Option<Answer>,
    ) -> Result<StepOutcome> {
        let actor = frame.ctx.actor;
        let installed = match card {
            CardRef::This => match frame.ctx.source {
                EffectSource::Card(card) => last_index_of(&state.in_play, card).map(|pos| {
                    state.in_play.remove(pos);
                    card
                }),
                EffectSource::Perpetual(_) => None,
                EffectSource::Zone(_) => {
                    return Err(EngineError::script("a zone cannot install itself as a perpetual"))
                }
            },
            CardRef::Id(card) => state.players[actor].hand.index_of(&card).map(|pos| {
                state.player_mut(actor).hand.remove(pos);
                card
            }),
            CardRef::Chosen => match answer {
                Some(Answer::Cards(cards)) => match cards.first() {
                    Some(index) => Some(state.take_from_hand(actor, *index)?),
                    None => None,
                },
                Some(_) => None,
                None => {
                    return Ok(Self::ask_hand_card(
                        state,
                        frame,
                        ChoiceKind::Perpetual,
                        "choose a card to keep as a perpetual",
                    ))
                }
            },
        };

        if let Some(card) = installed {
            state.player_mut(actor).add_perpetual(category, card);
            let name = state.card_name(card);
            state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
                format!("{} keeps {} as a {} perpetual", actor, name, category)
            });
        }
        Ok(StepOutcome::done())
    }

    fn remove_perpetual(
        state: &mut GameState,
        frame: &mut Frame,
        card: CardRef,
        category: Option<TriggerCategory>,
        answer: Option<Answer>,
    ) -> Result<StepOutcome> {
        let actor = frame.ctx.actor;
        let (target, category) = match card {
            CardRef::This => {
                let card = frame
                    .ctx
                    .source
                    .card()
                    .ok_or_else(|| EngineError::script("a zone has no perpetual to remove"))?;
                (card, category)
            }
            CardRef::Id(card) => (card, category),
            CardRef::Chosen => match answer {
                Some(Answer::Perpetual(r)) => (r.card, Some(r.category)),
                Some(_) => return Ok(StepOutcome::done()),
                None => {
                    let refs: Vec<PerpetualRef> = state.players[actor]
                        .perpetuals()
                        .filter(|(cat, _)| category.map_or(true, |wanted| wanted == *cat))
                        .map(|(category, card)| PerpetualRef {
                            owner: actor,
                            category,
                            card,
                        })
                        .collect();
                    if refs.is_empty() {
                        return Ok(StepOutcome::done());
                    }
                    let prompt = Self::prompt(state, &frame.ctx, "choose a perpetual to remove");
                    return Ok(StepOutcome::Suspend(PendingChoice::single(
                        ChoiceKind::Perpetual,
                        actor,
                        prompt,
                        ChoiceOptions::Perpetuals(refs),
                        frame.ctx.source,
                    )));
                }
            },
        };

        if state.player_mut(actor).remove_perpetual(target, category).is_some() {
            state.discard.push_back(target);
            let name = state.card_name(target);
            state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
                format!("{} discards perpetual {}", actor, name)
            });
        }
        Ok(StepOutcome::done())
    }

    fn sub_effect(
        state: &mut GameState,
        frame: &mut Frame,
        sub: SubEffect,
        answer: Option<Answer>,
    ) -> Result<StepOutcome> {
        let actor = frame.ctx.actor;
        match sub {
            SubEffect::Card(card) => Ok(StepOutcome::Continue(vec![Self::copy_frame(
                state, actor, card,
            )?])),

            SubEffect::ChooseFromHand => match answer {
                Some(Answer::Cards(cards)) => {
                    let card = cards
                        .first()
                        .and_then(|i| state.players[actor].hand.get(*i).copied());
                    match card {
                        Some(card) => {
                            let name = state.card_name(card);
                            state.note(Verbosity::Normal, LogCategory::Effect, Some(actor), || {
                                format!("{} copies {}", actor, name)
                            });
                            Ok(StepOutcome::Continue(vec![Self::copy_frame(state, actor, card)?]))
                        }
                        None => Ok(StepOutcome::done()),
                    }
                }
                Some(_) => Ok(StepOutcome::done()),
                None => Ok(Self::ask_hand_card(
                    state,
                    frame,
                    ChoiceKind::CopyEffect,
                    "choose a card whose effect to use",
                )),
            },

            SubEffect::ReplayPerpetual { with_hand_card } => match (answer, frame.scratch) {
                (None, None) => {
                    let refs: Vec<PerpetualRef> = state.players[actor]
                        .perpetuals()
                        .map(|(category, card)| PerpetualRef {
                            owner: actor,
                            category,
                            card,
                        })
                        .collect();
                    if refs.is_empty() {
                        return Ok(StepOutcome::done());
                    }
                    let prompt = Self::prompt(state, &frame.ctx, "choose a perpetual to replay");
                    Ok(StepOutcome::Suspend(PendingChoice::single(
                        ChoiceKind::Perpetual,
                        actor,
                        prompt,
                        ChoiceOptions::Perpetuals(refs),
                        frame.ctx.source,
                    )))
                }
                (Some(Answer::Perpetual(chosen)), None) => {
                    if with_hand_card && !state.players[actor].hand.is_empty() {
                        frame.scratch = Some(chosen);
                        Ok(Self::ask_bound_card(state, frame))
                    } else {
                        Ok(StepOutcome::Continue(vec![Self::replay_frame(
                            state, actor, chosen, None,
                        )?]))
                    }
                }
                (None, Some(_)) => Ok(Self::ask_bound_card(state, frame)),
                (Some(Answer::Cards(cards)), Some(chosen)) => {
                    let bound = cards.first().and_then(|index| {
                        state.players[actor]
                            .hand
                            .get(*index)
                            .map(|card| BoundCard { index: *index, card: *card })
                    });
                    Ok(StepOutcome::Continue(vec![Self::replay_frame(
                        state, actor, chosen, bound,
                    )?]))
                }
                (Some(_), Some(chosen)) => Ok(StepOutcome::Continue(vec![Self::replay_frame(
                    state, actor, chosen, None,
                )?])),
                (Some(_), None) => Ok(StepOutcome::done()),
            },
        }
    }

    fn copy_frame(state: &GameState, actor: PlayerId, card: CardId) -> Result<Task> {
        let steps = state.catalog.cards().require(card)?.play.steps().to_vec();
        let ctx = ResolutionContext::new(actor, EffectSource::Card(card));
        Ok(Task::Run(Frame::new(steps, ctx)))
    }

    fn replay_frame(
        state: &mut GameState,
        actor: PlayerId,
        chosen: PerpetualRef,
        bound: Option<BoundCard>,
    ) -> Result<Task> {
        let steps = state.catalog.cards().require(chosen.card)?.reactive.steps().to_vec();
        let name = state.card_name(chosen.card);
        state.note(Verbosity::Normal, LogCategory::Trigger, Some(actor), || {
            format!("{} replays perpetual {}", actor, name)
        });
        let ctx = ResolutionContext::new(actor, EffectSource::Perpetual(chosen.card)).with_bound(bound);
        Ok(Task::Run(Frame::new(steps, ctx)))
    }

    fn ask_bound_card(state: &GameState, frame: &Frame) -> StepOutcome {
        match Self::ask_hand_card(state, frame, ChoiceKind::CopyEffect, "choose a hand card for the replay") {
            StepOutcome::Suspend(choice) => StepOutcome::Suspend(choice.declinable(true)),
            other => other,
        }
    }

    /// Prompt the actor for one hand card; nothing to ask with an empty hand.
    fn ask_hand_card(state: &GameState, frame: &Frame, kind: ChoiceKind, text: &str) -> StepOutcome {
        let actor = frame.ctx.actor;
        let hand_size = state.players[actor].hand.len();
        if hand_size == 0 {
            return StepOutcome::done();
        }
        StepOutcome::Suspend(PendingChoice::single(
            kind,
            actor,
            Self::prompt(state, &frame.ctx, text),
            ChoiceOptions::HandCards((0..hand_size).collect()),
            frame.ctx.source,
        ))
    }

    /// Resolve an Age rule, or produce the prompt that resolves it.
    fn age(
        state: &GameState,
        frame: &Frame,
        rule: AgeRule,
        answer: Option<Answer>,
        kind: ChoiceKind,
    ) -> std::result::Result<Age, StepOutcome> {
        let here = state.players[frame.ctx.actor].zone;
        match (rule.fixed(here), answer) {
            (Some(age), _) => Ok(age),
            (None, Some(Answer::Age(age))) => Ok(age),
            (None, Some(_)) => Err(StepOutcome::done()),
            (None, None) => Err(StepOutcome::Suspend(PendingChoice::single(
                kind,
                frame.ctx.actor,
                Self::prompt(state, &frame.ctx, "choose an Age"),
                ChoiceOptions::Ages(Age::ALL.into_iter().collect()),
                frame.ctx.source,
            ))),
        }
    }

    fn amount(state: &GameState, ctx: &ResolutionContext, amount: Amount) -> Result<u32> {
        Ok(match amount {
            Amount::Fixed(n) => n,
            Amount::Discarded => ctx.discarded,
            Amount::Drawn => ctx.drawn,
            Amount::Hourglass => u32::from(state.zones.hourglass(Self::own_zone(ctx, "Hourglass")?)),
        })
    }

    fn condition(state: &GameState, ctx: &ResolutionContext, condition: &Condition) -> Result<bool> {
        let player = &state.players[ctx.actor];
        Ok(match condition {
            Condition::RulesAge { age, sole } => {
                let age = age.require_fixed(player.zone)?;
                CrownLedger::rules(&state.players, ctx.actor, age, *sole)
            }
            Condition::HourglassAtLeast(n) => {
                state.zones.hourglass(Self::own_zone(ctx, "HourglassAtLeast")?) >= *n
            }
            Condition::CoinsAtLeast(n) => player.coins >= *n,
            Condition::HandAtLeast(n) => player.hand.len() >= *n,
            Condition::DiscardedAtLeast(n) => ctx.discarded >= *n,
            Condition::Not(inner) => !Self::condition(state, ctx, inner)?,
        })
    }

    /// Hourglass steps may only run in the script of the zone they touch.
    fn own_zone(ctx: &ResolutionContext, what: &str) -> Result<Slot> {
        ctx.source.zone().ok_or_else(|| {
            EngineError::script(format!("{} used outside a zone script (source: {})", what, ctx.source))
        })
    }

    fn rebind(
        state: &mut GameState,
        slot: Slot,
        to: ZoneDefId,
        reason: RebindReason,
    ) -> Result<()> {
        let turn = state.turn_number;
        state.zones.rebind(state.catalog.zones(), slot, to, reason, turn)?;
        let name = state.catalog.zone(to).map_or_else(|| to.to_string(), |d| d.name.clone());
        state.note(Verbosity::Normal, LogCategory::Zone, None, || {
            format!("{} is now {} ({:?})", slot, name, reason)
        });
        Ok(())
    }

    fn prompt(state: &GameState, ctx: &ResolutionContext, text: &str) -> String {
        let source = match ctx.source {
            EffectSource::Card(card) | EffectSource::Perpetual(card) => state.card_name(card),
            EffectSource::Zone(slot) => state
                .zone_definition(slot)
                .map_or_else(|| slot.to_string(), |d| d.name.clone()),
        };
        format!("{}: {}", source, text)
    }
}

fn last_index_of(cards: &im::Vector<CardId>, card: CardId) -> Option<usize> {
    cards
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == card)
        .map(|(i, _)| i)
        .last()
}
