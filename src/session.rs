use crate::symmetry::SymmetryPattern;

/// Phases per round: show-target and symmetry quiz alternate.
pub const TOTAL_STEPS: u32 = 8;

/// Progress starts at 1 and gains one per finished phase.
pub const MAX_PROGRESS: u32 = TOTAL_STEPS + 1;

pub const DEFAULT_SESSION_SECS: u32 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub level: u32,
    pub sequence_step: u32,
    pub total_steps: u32,
    pub time_remaining: u32,
    pub progress: u32,
    pub paused: bool,
    pub active: bool,
    pub selection_phase: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            level: 1,
            sequence_step: 0,
            total_steps: TOTAL_STEPS,
            time_remaining: DEFAULT_SESSION_SECS,
            progress: 1,
            paused: false,
            active: false,
            selection_phase: false,
        }
    }
}

impl SessionState {
    pub fn new(session_secs: u32) -> Self {
        Self {
            time_remaining: session_secs,
            ..Self::default()
        }
    }

    /// Clears everything a round accumulates while keeping the level.
    pub fn reset_round(&mut self, session_secs: u32) {
        *self = Self {
            level: self.level,
            ..Self::new(session_secs)
        };
    }

    pub fn sequence_finished(&self) -> bool {
        self.sequence_step >= self.total_steps
    }

    pub fn progress_percent(&self) -> f64 {
        let max_progress = (self.total_steps + 1) as f64;
        ((self.progress as f64 / max_progress) * 100.0).clamp(0.0, 100.0)
    }

    /// Bumps the step counters once a phase has finished.
    pub fn complete_step(&mut self) {
        self.sequence_step += 1;
        self.progress = (self.progress + 1).min(self.total_steps + 1);
    }
}

/// One highlighted target, in the order it was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShownStep {
    pub target_id: usize,
    pub order: usize,
    pub display_duration_ms: u64,
    pub phase_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetryAttempt {
    pub pattern: &'static SymmetryPattern,
    pub player_answer: bool,
    pub correct: bool,
    pub phase_index: u32,
}

impl SymmetryAttempt {
    pub fn judge(pattern: &'static SymmetryPattern, player_answer: bool, phase_index: u32) -> Self {
        Self {
            pattern,
            player_answer,
            correct: player_answer == pattern.is_symmetric,
            phase_index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEntry {
    pub target_id: usize,
    pub selection_order: usize,
}
