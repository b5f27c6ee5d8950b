use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::{Config, ConfigChange};
use crate::game::GameInput;

const BALL_TIME_STEP_MS: u64 = 100;
const SYMMETRY_TIME_STEP_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Game(GameInput),
    Quit,
}

pub fn command_for_key(key: &KeyEvent, config: &Config) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    let input = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return Some(Command::Quit),
        KeyCode::Char('s') => GameInput::StartRequested,
        KeyCode::Char(' ') => GameInput::PauseToggle,
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('1') => {
            GameInput::SymmetryAnswered(true)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('2') => {
            GameInput::SymmetryAnswered(false)
        }
        KeyCode::Enter => GameInput::Submit,
        KeyCode::Backspace => GameInput::ResetSelection,
        KeyCode::Char('r') => GameInput::Restart,
        KeyCode::Char('+') | KeyCode::Char('=') => GameInput::ConfigChanged(
            ConfigChange::BallDisplayTime(config.ball_display_time_ms + BALL_TIME_STEP_MS),
        ),
        KeyCode::Char('-') => GameInput::ConfigChanged(ConfigChange::BallDisplayTime(
            config.ball_display_time_ms.saturating_sub(BALL_TIME_STEP_MS),
        )),
        KeyCode::Char(']') => GameInput::ConfigChanged(ConfigChange::SymmetryTime(
            config.symmetry_time_ms + SYMMETRY_TIME_STEP_MS,
        )),
        KeyCode::Char('[') => GameInput::ConfigChanged(ConfigChange::SymmetryTime(
            config.symmetry_time_ms.saturating_sub(SYMMETRY_TIME_STEP_MS),
        )),
        _ => return None,
    };
    Some(Command::Game(input))
}
