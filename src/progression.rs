use crate::scoring::ScoreResult;
use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Advance { next_level: u32 },
    Complete,
    Retry,
}

pub fn decide(score: &ScoreResult, level: u32, max_level: u32, threshold: u32) -> Decision {
    if score.overall < threshold {
        Decision::Retry
    } else if level < max_level {
        Decision::Advance {
            next_level: level + 1,
        }
    } else {
        Decision::Complete
    }
}

/// Moves the session onto the round the decision calls for. `Complete`
/// leaves the level alone; the caller restarts the whole session.
pub fn apply(decision: Decision, state: &mut SessionState, session_secs: u32) {
    match decision {
        Decision::Advance { next_level } => {
            state.level = next_level;
            state.reset_round(session_secs);
        }
        Decision::Retry => state.reset_round(session_secs),
        Decision::Complete => {
            state.active = false;
            state.selection_phase = false;
        }
    }
}
