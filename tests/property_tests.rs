//! Randomized driver properties.
//!
//! A driver repeatedly picks one of `legal_commands()` and applies it.
//! Whatever it picks, the ledger and card-conservation invariants hold
//! and rejected commands leave no trace.

use proptest::prelude::*;

use temporum_engine::core::{Command, GameRng, GameSetup, PlayerId};
use temporum_engine::error::EngineError;
use temporum_engine::rules::{Game, RulesEngine};

fn new_game(seed: u64, players: usize) -> Game {
    Game::standard(GameSetup::new(players), Box::new(GameRng::new(seed))).expect("standard setup")
}

/// Everything a command may touch, rendered for comparison.
fn snapshot(game: &Game) -> String {
    let s = game.state();
    format!(
        "{:?} {:?} {:?} {:?} {:?} {:?} {:?} {:?} {} {} {} {}",
        s.players(),
        s.deck(),
        s.discard_pile(),
        s.in_play(),
        s.zones(),
        s.pending(),
        s.stack(),
        s.phase(),
        s.turn_number(),
        s.actions_remaining(),
        s.history().len(),
        s.log().len(),
    )
}

/// Drive `game` with `picks`, checking invariants after every command.
/// Returns the commands that were accepted.
fn drive(game: &mut Game, picks: &[usize]) -> Result<Vec<Command>, TestCaseError> {
    let players: Vec<PlayerId> = game.state().turn_order().to_vec();
    let total = game.state().card_total();
    let pool = u32::from(game.state().rules().crown_pool);
    let mut accepted = Vec::new();

    for pick in picks {
        let legal = game.legal_commands();
        prop_assert!(!legal.is_empty(), "a running game always has a legal command");
        prop_assert_eq!(&legal, &game.legal_commands());

        let command = legal[pick % legal.len()].clone();
        let before = snapshot(game);
        match game.apply(command.clone()) {
            Ok(_) => accepted.push(command),
            Err(EngineError::ChainDepthExceeded(_)) => {
                // A long enough copy-of-a-copy chain can hit the limit.
                prop_assert_eq!(before, snapshot(game));
                break;
            }
            Err(err) => return Err(TestCaseError::fail(format!("{} rejected: {}", command, err))),
        }

        for player in &players {
            let track = game.score_track(*player).unwrap();
            prop_assert_eq!(track.iter().map(|c| u32::from(*c)).sum::<u32>(), pool);
        }
        prop_assert_eq!(game.state().card_total(), total);
        if game.pending_choice().is_none() {
            prop_assert!(game.state().stack().is_empty());
            prop_assert!(game.state().in_play().is_empty());
        }

        let before = snapshot(game);
        prop_assert!(game.apply(Command::PlayCard(99)).is_err());
        prop_assert_eq!(before, snapshot(game));
    }
    Ok(accepted)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_random_play_keeps_invariants(
        seed in any::<u64>(),
        players in 1usize..5,
        picks in prop::collection::vec(any::<usize>(), 1..150),
    ) {
        let mut game = new_game(seed, players);
        drive(&mut game, &picks)?;
    }

    #[test]
    fn prop_same_seed_same_game(
        seed in any::<u64>(),
        picks in prop::collection::vec(any::<usize>(), 1..80),
    ) {
        let mut a = new_game(seed, 3);
        let mut b = new_game(seed, 3);
        let left = drive(&mut a, &picks)?;
        let right = drive(&mut b, &picks)?;
        prop_assert_eq!(left, right);
        prop_assert_eq!(snapshot(&a), snapshot(&b));
        prop_assert_eq!(a.log().entries(), b.log().entries());
    }

    #[test]
    fn prop_finish_stops_everything(
        seed in any::<u64>(),
        picks in prop::collection::vec(any::<usize>(), 0..40),
    ) {
        let mut game = new_game(seed, 2);
        drive(&mut game, &picks)?;
        game.finish();
        prop_assert!(game.is_finished());
        prop_assert!(game.pending_choice().is_none());
        prop_assert!(game.legal_commands().is_empty());
        prop_assert!(game.apply(Command::EndTurn).is_err());
    }
}
