//! Worked scenarios against the standard catalog.
//!
//! Each test sets up a small fixture, drives it command by command the way
//! a scripted fixture runner would, and checks the end state through the
//! query interface only.

use temporum_engine::catalog::standard::{
    ARTIST, BARBARIAN_HORDE, CAMPFIRE, GANG_OF_PICKPOCKETS, GIZMO, TRADE_GOODS, TRINKET, VISIONARY,
};
use temporum_engine::choice::ChoiceKind;
use temporum_engine::core::{Age, GameSetup, IdentityShuffle, PlayerId, PlayerSetup, Slot};
use temporum_engine::rules::Game;
use temporum_engine::stack::ResolutionStatus;
use temporum_engine::triggers::TriggerCategory;

const P0: PlayerId = PlayerId::new(0);

fn game(setup: GameSetup) -> Game {
    Game::standard(setup, Box::new(IdentityShuffle)).expect("valid setup")
}

fn awaiting(kind: ChoiceKind) -> ResolutionStatus {
    ResolutionStatus::AwaitingChoice { player: P0, kind }
}

/// Cold War draws one card and pays two; Artist pays six.
#[test]
fn test_artist_after_cold_war() {
    let mut g = game(
        GameSetup::new(2)
            .with_player(0, PlayerSetup::new().with_hand([ARTIST]).at(Slot(5)))
            .with_deck([TRADE_GOODS; 5]),
    );

    g.visit_zone(Slot(6)).unwrap();
    assert_eq!(g.coins(P0).unwrap(), 2);
    assert_eq!(g.hand_size(P0).unwrap(), 2);

    assert!(g.play_card(0).unwrap().is_complete());
    assert_eq!(g.coins(P0).unwrap(), 8);
    assert_eq!(g.hand_size(P0).unwrap(), 1);
    assert_eq!(g.discard_pile().len(), 1);
}

/// Gizmo copies Trinket, which plays Artist twice; then Trinket itself
/// plays the other Artist twice.
#[test]
fn test_gizmo_trinket_artist_chain() {
    let mut g = game(
        GameSetup::new(2)
            .with_player(0, PlayerSetup::new().with_hand([GIZMO, TRINKET, ARTIST, ARTIST]))
            .bind(Slot(0), CAMPFIRE)
            .with_deck([TRADE_GOODS; 5]),
    );

    g.visit_zone(Slot(0)).unwrap();
    assert!(g.has_base(P0, Slot(0)).unwrap());

    assert_eq!(g.play_card(0).unwrap(), awaiting(ChoiceKind::CopyEffect));
    // Hand is now [Trinket, Artist, Artist]; copy Trinket.
    assert_eq!(g.play_card(0).unwrap(), awaiting(ChoiceKind::PlayCard));
    assert_eq!(g.hand_size(P0).unwrap(), 3);
    assert!(g.play_card(1).unwrap().is_complete());
    assert_eq!(g.coins(P0).unwrap(), 12);
    assert_eq!(g.hand(P0).unwrap().iter().copied().collect::<Vec<_>>(), vec![TRINKET, ARTIST]);

    assert_eq!(g.play_card(0).unwrap(), awaiting(ChoiceKind::PlayCard));
    assert!(g.play_card(0).unwrap().is_complete());
    assert_eq!(g.coins(P0).unwrap(), 24);
    assert_eq!(g.hand_size(P0).unwrap(), 0);
    assert_eq!(g.discard_pile().len(), 4);
    assert!(g.state().in_play().is_empty());
}

/// With nothing else in hand, Barbarian Horde has nothing to discard and
/// therefore nothing to draw.
#[test]
fn test_barbarian_horde_empty_hand() {
    let mut g = game(
        GameSetup::new(2)
            .with_player(0, PlayerSetup::new().with_hand([BARBARIAN_HORDE]))
            .bind(Slot(0), CAMPFIRE)
            .with_deck([TRADE_GOODS; 5]),
    );

    g.visit_zone(Slot(0)).unwrap();
    assert!(g.play_card(0).unwrap().is_complete());
    assert_eq!(g.coins(P0).unwrap(), 9);
    assert_eq!(g.hand_size(P0).unwrap(), 0);
}

#[test]
fn test_barbarian_horde_discard_then_draw() {
    let mut g = game(
        GameSetup::new(2)
            .with_player(0, PlayerSetup::new().with_hand([BARBARIAN_HORDE, ARTIST]))
            .bind(Slot(0), CAMPFIRE)
            .with_deck([TRADE_GOODS; 5]),
    );

    g.visit_zone(Slot(0)).unwrap();
    assert_eq!(g.play_card(0).unwrap(), awaiting(ChoiceKind::Discard));
    assert!(g.discard_many([0]).unwrap().is_complete());

    assert_eq!(g.coins(P0).unwrap(), 9);
    assert_eq!(g.hand(P0).unwrap().iter().copied().collect::<Vec<_>>(), vec![TRADE_GOODS]);
    assert!(g.discard_pile().contains(&ARTIST));
}

#[test]
fn test_barbarian_horde_discard_nothing() {
    let mut g = game(
        GameSetup::new(2)
            .with_player(0, PlayerSetup::new().with_hand([BARBARIAN_HORDE, ARTIST]))
            .bind(Slot(0), CAMPFIRE)
            .with_deck([TRADE_GOODS; 5]),
    );

    g.visit_zone(Slot(0)).unwrap();
    g.play_card(0).unwrap();
    assert!(g.discard_many([]).unwrap().is_complete());
    assert_eq!(g.coins(P0).unwrap(), 9);
    assert_eq!(g.hand(P0).unwrap().iter().copied().collect::<Vec<_>>(), vec![ARTIST]);
}

/// Gang of Pickpockets draws after every play. Visionary's advance into
/// Age I has no earlier Age to pull from, so the track does not move.
#[test]
fn test_visionary_with_gang_of_pickpockets() {
    let mut g = game(
        GameSetup::new(2)
            .with_player(
                0,
                PlayerSetup::new()
                    .with_hand([VISIONARY, ARTIST])
                    .with_score_track([9, 1, 0, 0])
                    .with_perpetual(TriggerCategory::PostPlay, GANG_OF_PICKPOCKETS)
                    .at(Slot(5)),
            )
            .with_deck([TRADE_GOODS; 6]),
    );

    g.visit_zone(Slot(6)).unwrap();
    assert_eq!(g.hand_size(P0).unwrap(), 3);

    assert_eq!(g.play_card(0).unwrap(), awaiting(ChoiceKind::AdvanceCrown));
    assert!(g.advance_crown(Age::I).unwrap().is_complete());
    assert_eq!(g.hand_size(P0).unwrap(), 3);

    g.play_card(0).unwrap();
    assert_eq!(g.coins(P0).unwrap(), 8);
    assert_eq!(g.hand_size(P0).unwrap(), 3);
    assert_eq!(g.score_track(P0).unwrap(), [9, 1, 0, 0]);
}
