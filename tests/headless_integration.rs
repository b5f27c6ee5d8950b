use std::sync::mpsc;
use std::time::Duration;

use assert_matches::assert_matches;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::{rngs::StdRng, SeedableRng};

use symspan::config::Config;
use symspan::game::{Game, GameInput};
use symspan::keymap::{command_for_key, Command};
use symspan::presenter::TextField;
use symspan::progression::Decision;
use symspan::runtime::{ChannelEvents, GameEvent, Runner};
use symspan::sequence::Phase;
use symspan::view::BoardView;

const STEP_MS: u64 = 50;

type TestGame = Game<BoardView, StdRng>;

fn game_with(config: Config) -> TestGame {
    Game::new(config, BoardView::new(), StdRng::seed_from_u64(7))
}

/// Plays virtual time forward until the round asks for a selection, answering
/// each quiz with `answer(is_symmetric)`.
fn play_until_selection(game: &mut TestGame, answer: impl Fn(bool) -> bool) {
    for _ in 0..2_000u32 {
        if game.phase() == Phase::Selection {
            return;
        }
        if let Phase::Quiz(quiz) = game.phase() {
            if !quiz.resolved {
                game.handle(GameInput::SymmetryAnswered(answer(quiz.pattern.is_symmetric)));
            }
        }
        game.advance_time(STEP_MS);
    }
    panic!("round never reached selection, phase = {:?}", game.phase());
}

/// Selects every shown target once, in the order it first lit up.
fn select_shown_targets(game: &mut TestGame) {
    let mut picked: Vec<usize> = Vec::new();
    for step in game.round().shown().to_vec() {
        if !picked.contains(&step.target_id) {
            picked.push(step.target_id);
            game.handle(GameInput::TargetClicked(step.target_id));
        }
    }
}

/// Runs the clock to one millisecond before the next round may begin and
/// checks that nothing from the evaluated round fired in between.
fn assert_no_leftover_work(game: &mut TestGame) {
    let phase = game.phase();
    let state = game.state().clone();
    let selected = game.round().selection().len();

    game.advance_time(game.config().settle_delay_ms - 1);

    assert_eq!(game.phase(), phase);
    assert_eq!(game.state(), &state);
    assert_eq!(game.state().time_remaining, game.config().session_secs);
    assert_eq!(game.round().selection().len(), selected);
    assert!(!game.view().overlay_visible());
    assert_eq!(game.view().active_target(), None);
}

#[test]
fn correct_round_advances_to_next_level() {
    // duplicates in the shown sequence still leave the score above 50
    let mut game = game_with(Config {
        level_advancement_threshold: 50,
        ..Config::default()
    });

    game.handle(GameInput::StartRequested);
    assert_eq!(game.phase(), Phase::Pending);

    play_until_selection(&mut game, |symmetric| symmetric);
    assert_eq!(game.round().shown().len(), 4);
    assert_eq!(game.round().symmetry_results().len(), 4);
    assert!(game.state().selection_phase);
    assert_eq!(game.view().text(TextField::TotalNeeded), "4");

    select_shown_targets(&mut game);
    game.handle(GameInput::Submit);

    assert_matches!(game.phase(), Phase::Evaluated(Decision::Advance { next_level: 2 }));
    let score = game.last_score().expect("round was scored");
    assert_eq!(score.symmetry_accuracy, 100);
    assert_eq!(game.state().level, 2);
    assert_eq!(game.state().sequence_step, 0);
    assert!(game.view().text(TextField::Message).starts_with("Excellent!"));
    assert_no_leftover_work(&mut game);

    // next round starts after the settle delay with a denser board
    game.advance_time(1);
    assert_matches!(game.phase(), Phase::Show { step: 0, .. });
    assert_eq!(game.round().placements().len(), 23);
    assert_eq!(game.view().targets().len(), 23);
}

#[test]
fn failed_round_retries_same_level() {
    let mut game = game_with(Config::default());
    game.handle(GameInput::StartRequested);

    play_until_selection(&mut game, |symmetric| !symmetric);
    game.handle(GameInput::Submit);

    assert_matches!(game.phase(), Phase::Evaluated(Decision::Retry));
    assert_eq!(game.last_score().map(|s| s.overall), Some(0));
    assert_eq!(game.state().level, 1);
    assert_no_leftover_work(&mut game);

    game.advance_time(1);
    assert_matches!(game.phase(), Phase::Show { .. });
    assert_eq!(game.state().level, 1);
    assert_eq!(game.state().time_remaining, game.config().session_secs - 1);
    assert_eq!(game.round().placements().len(), 19);
}

#[test]
fn unanswered_quizzes_count_as_no() {
    let mut game = game_with(Config::default());
    game.handle(GameInput::StartRequested);

    for _ in 0..2_000u32 {
        if game.phase() == Phase::Selection {
            break;
        }
        game.advance_time(STEP_MS);
    }

    assert_eq!(game.phase(), Phase::Selection);
    let results = game.round().symmetry_results();
    assert_eq!(results.len(), 4);
    for attempt in results {
        assert!(!attempt.player_answer);
        assert_eq!(attempt.correct, !attempt.pattern.is_symmetric);
    }
}

#[test]
fn restart_cancels_everything_in_flight() {
    let mut game = game_with(Config::default());
    game.handle(GameInput::StartRequested);
    game.advance_time(2_500);
    assert!(game.phase().is_running());

    game.handle(GameInput::Restart);
    assert_eq!(game.phase(), Phase::Idle);

    // nothing scheduled before the restart may touch the fresh session
    game.advance_time(60_000);
    assert_eq!(game.phase(), Phase::Idle);
    assert!(!game.state().active);
    assert_eq!(game.state().level, 1);
    assert_eq!(game.state().sequence_step, 0);
    assert_eq!(game.state().progress, 1);
    assert_eq!(game.state().time_remaining, game.config().session_secs);
    assert!(game.round().shown().is_empty());
    assert_eq!(game.view().text(TextField::Timer), "05:00");
    assert_eq!(game.view().text(TextField::GameInstruction), "Press Start to Begin!");
}

#[test]
fn session_timeout_ends_round_and_returns_to_start() {
    let mut game = game_with(Config {
        session_secs: 2,
        ..Config::default()
    });
    game.handle(GameInput::StartRequested);

    game.advance_time(120);
    assert_eq!(game.view().text(TextField::Timer), "00:02");

    game.advance_time(2_000);
    assert_eq!(game.phase(), Phase::Ended);
    assert_eq!(game.view().text(TextField::Message), "Time's Up!");
    assert_eq!(game.view().text(TextField::Timer), "00:00");
    assert!(!game.state().active);
    assert!(!game.view().overlay_visible());
    assert_eq!(game.view().active_target(), None);

    // the abandoned round's phase tasks and clock ticks stay dead
    let shown = game.round().shown().len();
    let answered = game.round().symmetry_results().len();
    game.advance_time(game.config().settle_delay_ms - 1);
    assert_eq!(game.phase(), Phase::Ended);
    assert_eq!(game.state().time_remaining, 0);
    assert_eq!(game.state().sequence_step, 1);
    assert_eq!(game.round().shown().len(), shown);
    assert_eq!(game.round().symmetry_results().len(), answered);
    assert_eq!(game.view().text(TextField::Timer), "00:00");

    game.advance_time(1);
    assert_eq!(game.phase(), Phase::Idle);
    assert_eq!(game.state().level, 1);
    assert_eq!(game.state().time_remaining, 2);

    game.advance_time(60_000);
    assert_eq!(game.phase(), Phase::Idle);
    assert!(!game.state().active);
}

#[test]
fn completing_the_last_level_returns_to_start() {
    let mut game = game_with(Config {
        max_level: 1,
        level_advancement_threshold: 0,
        ..Config::default()
    });
    game.handle(GameInput::StartRequested);
    play_until_selection(&mut game, |symmetric| symmetric);
    select_shown_targets(&mut game);
    game.handle(GameInput::Submit);

    assert_matches!(game.phase(), Phase::Evaluated(Decision::Complete));
    assert!(!game.state().active);
    assert!(!game.state().selection_phase);
    assert!(game
        .view()
        .text(TextField::Message)
        .starts_with("GAME COMPLETED!"));

    let settle = game.config().settle_delay_ms;
    game.advance_time(settle - 1);
    assert_matches!(game.phase(), Phase::Evaluated(Decision::Complete));

    game.advance_time(1);
    assert_eq!(game.phase(), Phase::Idle);
    assert_eq!(game.state().level, 1);
    assert!(!game.state().active);
    assert!(game.round().shown().is_empty());
    assert_eq!(game.view().text(TextField::GameInstruction), "Press Start to Begin!");

    game.advance_time(60_000);
    assert_eq!(game.phase(), Phase::Idle);
    assert_eq!(game.state().time_remaining, game.config().session_secs);
    assert_eq!(game.state().level, 1);

    // and a new game can start from there
    game.handle(GameInput::StartRequested);
    assert_eq!(game.phase(), Phase::Pending);
}

#[test]
fn pause_freezes_virtual_time() {
    let mut game = game_with(Config::default());
    game.handle(GameInput::StartRequested);
    game.advance_time(500);

    let phase = game.phase();
    let now = game.now_ms();
    game.handle(GameInput::PauseToggle);
    assert!(game.state().paused);
    assert_eq!(game.view().text(TextField::GameInstruction), "Game Paused");

    game.advance_time(30_000);
    game.handle(GameInput::StartRequested);
    assert_eq!(game.phase(), phase);
    assert_eq!(game.now_ms(), now);
    assert_eq!(game.state().time_remaining, game.config().session_secs - 1);

    game.handle(GameInput::PauseToggle);
    assert!(!game.state().paused);
    game.advance_time(1_500);
    assert_ne!(game.phase(), phase);
}

#[test]
fn start_is_ignored_while_a_round_runs() {
    let mut game = game_with(Config::default());
    game.handle(GameInput::StartRequested);
    game.advance_time(200);
    let shown = game.round().shown().to_vec();

    game.handle(GameInput::StartRequested);
    game.advance_time(200);
    assert_eq!(game.round().shown(), &shown[..]);
}

#[test]
fn submit_outside_selection_is_ignored() {
    let mut game = game_with(Config::default());
    game.handle(GameInput::Submit);
    assert_eq!(game.phase(), Phase::Idle);
    assert!(game.last_score().is_none());
}

#[test]
fn selection_toggle_and_reset_through_inputs() {
    let mut game = game_with(Config::default());
    game.handle(GameInput::StartRequested);
    play_until_selection(&mut game, |symmetric| symmetric);

    let ids: Vec<usize> = game.round().placements().iter().map(|p| p.id).take(3).collect();
    for &id in &ids {
        game.handle(GameInput::TargetClicked(id));
    }
    assert_eq!(game.view().text(TextField::SelectedCount), "3");

    // removing the first renumbers the rest
    game.handle(GameInput::TargetClicked(ids[0]));
    let orders: Vec<usize> = game
        .round()
        .selection()
        .iter()
        .map(|e| e.selection_order)
        .collect();
    assert_eq!(orders, vec![1, 2]);

    game.handle(GameInput::ResetSelection);
    assert!(game.round().selection().is_empty());
    assert_eq!(game.view().text(TextField::SelectedCount), "0");
    assert_eq!(game.phase(), Phase::Selection);
}

// Drives the game the way the binary does: Runner + channel events + keymap.
#[test]
fn headless_key_flow_starts_and_pauses() {
    let mut game = game_with(Config::default());

    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(ChannelEvents::new(rx), Duration::from_millis(5));

    for c in ['s', ' ', 'q'] {
        tx.send(GameEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
            .unwrap();
    }

    let mut quit = false;
    for _ in 0..100u32 {
        match runner.step().event {
            GameEvent::Tick | GameEvent::Resize | GameEvent::Mouse(_) => {}
            GameEvent::Key(key) => match command_for_key(&key, game.config()) {
                Some(Command::Quit) => {
                    quit = true;
                    break;
                }
                Some(Command::Game(input)) => {
                    game.handle(input);
                    game.advance_time(200);
                }
                None => {}
            },
        }
    }

    assert!(quit, "q should quit the loop");
    assert!(game.state().active);
    assert!(game.state().paused);
    assert_eq!(game.view().text(TextField::PlayButton), "▶");
}
