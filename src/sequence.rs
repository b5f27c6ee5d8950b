//! Phase state machine for one round: alternating show / quiz phases, then
//! selection. Every delay is a task on the shared [`Timeline`], stamped with
//! the [`RoundToken`] current at scheduling time; the owner drops tasks whose
//! token no longer matches, so a reset can never be undone by a late task.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::clock::ClockRun;
use crate::config::{Config, CLOCK_TICK_MS, MIN_BALL_DISPLAY_MS, PHASE_SETTLE_MS, QUIZ_CLEAR_MS};
use crate::layout::{target_count, LayoutGenerator, TargetPlacement};
use crate::presenter::{Presenter, TextField};
use crate::progression::Decision;
use crate::scoring::{self, EvaluationError, ScoreResult};
use crate::session::{SelectionEntry, SessionState, ShownStep, SymmetryAttempt};
use crate::symmetry::{SymmetryBank, SymmetryPattern, GRID_COLUMNS};
use crate::timeline::Timeline;

/// Generation of the current round; bumped by every reset path.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundToken(u64);

impl RoundToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    BeginRound,
    Advance,
    EndShow { step: u32 },
    QuizTick { step: u32 },
    ClearQuiz { step: u32 },
    ClockTick(ClockRun),
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub token: RoundToken,
    pub task: Task,
}

/// Everything a phase transition reads or writes besides the phase itself.
#[derive(Debug)]
pub struct Stage<P, R> {
    pub state: SessionState,
    pub config: Config,
    pub timeline: Timeline<Scheduled>,
    pub token: RoundToken,
    pub view: P,
    pub rng: R,
}

impl<P: Presenter, R: Rng> Stage<P, R> {
    pub fn new(config: Config, view: P, rng: R) -> Self {
        let config = config.normalized();
        Self {
            state: SessionState::new(config.session_secs),
            config,
            timeline: Timeline::new(),
            token: RoundToken::default(),
            view,
            rng,
        }
    }

    pub fn schedule(&mut self, delay_ms: u64, task: Task) {
        let token = self.token;
        self.timeline.schedule(delay_ms, Scheduled { token, task });
    }

    /// Invalidates everything scheduled so far.
    pub fn next_round_token(&mut self) {
        self.token = self.token.next();
    }

    fn sync_progress(&mut self) {
        self.view.set_progress_bar(self.state.progress_percent());
        self.view
            .set_text(TextField::ProgressText, &self.state.progress.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quiz {
    pub pattern: &'static SymmetryPattern,
    pub step: u32,
    pub seconds_left: u32,
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A round is scheduled to begin.
    Pending,
    /// Between two phases of a running round.
    Settling,
    Show { target: usize, step: u32 },
    Quiz(Quiz),
    Selection,
    Evaluated(Decision),
    /// Session ended by time-out, waiting for the restart.
    Ended,
}

impl Phase {
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            Phase::Settling | Phase::Show { .. } | Phase::Quiz(_)
        )
    }
}

/// What one round accumulates.
#[derive(Debug, Default, Clone)]
pub struct Round {
    placements: Vec<TargetPlacement>,
    shown: Vec<ShownStep>,
    symmetry_results: Vec<SymmetryAttempt>,
    selection: Vec<SelectionEntry>,
}

impl Round {
    pub fn placements(&self) -> &[TargetPlacement] {
        &self.placements
    }

    pub fn shown(&self) -> &[ShownStep] {
        &self.shown
    }

    pub fn symmetry_results(&self) -> &[SymmetryAttempt] {
        &self.symmetry_results
    }

    pub fn selection(&self) -> &[SelectionEntry] {
        &self.selection
    }
}

#[derive(Debug)]
pub struct SequenceScheduler {
    phase: Phase,
    round: Round,
    layout: LayoutGenerator,
    bank: SymmetryBank,
}

impl Default for SequenceScheduler {
    fn default() -> Self {
        Self::new(LayoutGenerator::default(), SymmetryBank::standard())
    }
}

impl SequenceScheduler {
    pub fn new(layout: LayoutGenerator, bank: SymmetryBank) -> Self {
        Self {
            phase: Phase::Idle,
            round: Round::default(),
            layout,
            bank,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn current_pattern(&self) -> Option<&'static SymmetryPattern> {
        match self.phase {
            Phase::Quiz(quiz) => Some(quiz.pattern),
            _ => None,
        }
    }

    pub fn mark_pending(&mut self) {
        self.phase = Phase::Pending;
    }

    pub fn mark_evaluated(&mut self, decision: Decision) {
        self.phase = Phase::Evaluated(decision);
    }

    /// Lays out a fresh board and runs the first phase.
    pub fn begin_round<P: Presenter, R: Rng>(&mut self, stage: &mut Stage<P, R>) {
        let (width, height) = stage.view.board_size();
        let count = target_count(stage.state.level);
        let placements = self.layout.generate(count, width, height, &mut stage.rng);
        info!(level = stage.state.level, count, "round started");

        stage.view.show_symmetry_overlay(false);
        stage.view.show_selection_controls(false);
        stage.view.render_board(&placements);
        stage.sync_progress();

        self.round = Round {
            placements,
            ..Round::default()
        };
        self.phase = Phase::Settling;
        self.advance(stage);
    }

    pub fn advance<P: Presenter, R: Rng>(&mut self, stage: &mut Stage<P, R>) {
        if !stage.state.active || self.phase != Phase::Settling {
            return;
        }
        if stage.state.sequence_finished() {
            self.enter_selection(stage);
        } else if stage.state.sequence_step % 2 == 0 {
            self.show_target(stage);
        } else {
            self.show_quiz(stage);
        }
    }

    fn show_target<P: Presenter, R: Rng>(&mut self, stage: &mut Stage<P, R>) {
        let step = stage.state.sequence_step;
        // with replacement: a target may come up more than once per round
        let picked = self
            .round
            .placements
            .choose(&mut stage.rng)
            .map(|p| p.id)
            .filter(|&id| stage.view.has_target(id));

        let Some(target) = picked else {
            warn!(step, "no target to highlight, skipping phase");
            self.finish_step(stage);
            return;
        };

        let duration = stage.config.ball_display_time_ms.max(MIN_BALL_DISPLAY_MS);
        let order = self.round.shown.len() + 1;
        stage.view.set_text(
            TextField::GameInstruction,
            &format!(
                "Remember this target! ({:.1}s) - Sequence #{order}",
                duration as f64 / 1000.0
            ),
        );
        stage.view.set_target_active(target, true);

        self.round.shown.push(ShownStep {
            target_id: target,
            order,
            display_duration_ms: duration,
            phase_index: step,
        });
        debug!(step, target, order, "showing target");

        self.phase = Phase::Show { target, step };
        stage.schedule(duration, Task::EndShow { step });
    }

    pub fn end_show<P: Presenter, R: Rng>(&mut self, step: u32, stage: &mut Stage<P, R>) {
        let Phase::Show { target, step: shown_at } = self.phase else {
            return;
        };
        if shown_at != step {
            return;
        }
        stage.view.set_target_active(target, false);
        self.finish_step(stage);
    }

    fn show_quiz<P: Presenter, R: Rng>(&mut self, stage: &mut Stage<P, R>) {
        let step = stage.state.sequence_step;
        let pattern = self.bank.pick_random(&mut stage.rng);
        let seconds_left = stage.config.symmetry_countdown_secs();

        stage
            .view
            .set_text(TextField::SymmetryQuestion, pattern.prompt_text);
        stage.view.render_symmetry_grid(&pattern.cells, GRID_COLUMNS);
        stage.view.show_symmetry_overlay(true);
        stage
            .view
            .set_text(TextField::SymmetryTimer, &seconds_left.to_string());
        debug!(step, seconds_left, symmetric = pattern.is_symmetric, "quiz shown");

        self.phase = Phase::Quiz(Quiz {
            pattern,
            step,
            seconds_left,
            resolved: false,
        });
        stage.schedule(CLOCK_TICK_MS, Task::QuizTick { step });
    }

    pub fn quiz_tick<P: Presenter, R: Rng>(&mut self, step: u32, stage: &mut Stage<P, R>) {
        let Phase::Quiz(quiz) = &mut self.phase else {
            return;
        };
        if quiz.step != step || quiz.resolved {
            return;
        }

        quiz.seconds_left = quiz.seconds_left.saturating_sub(1);
        let seconds_left = quiz.seconds_left;
        stage
            .view
            .set_text(TextField::SymmetryTimer, &seconds_left.to_string());

        if seconds_left == 0 {
            debug!(step, "quiz timed out");
            self.answer(false, stage);
        } else {
            stage.schedule(CLOCK_TICK_MS, Task::QuizTick { step });
        }
    }

    /// Records the one attempt for the current quiz. Returns false when there
    /// is no open quiz (already answered, or not in a quiz at all).
    pub fn answer<P: Presenter, R: Rng>(&mut self, answer: bool, stage: &mut Stage<P, R>) -> bool {
        let Phase::Quiz(quiz) = &mut self.phase else {
            return false;
        };
        if quiz.resolved {
            return false;
        }
        quiz.resolved = true;

        let attempt = SymmetryAttempt::judge(quiz.pattern, answer, quiz.step);
        debug!(step = quiz.step, answer, correct = attempt.correct, "quiz answered");
        let step = quiz.step;
        self.round.symmetry_results.push(attempt);
        stage.schedule(QUIZ_CLEAR_MS, Task::ClearQuiz { step });
        true
    }

    pub fn clear_quiz<P: Presenter, R: Rng>(&mut self, step: u32, stage: &mut Stage<P, R>) {
        let Phase::Quiz(Quiz {
            step: quiz_step,
            resolved: true,
            ..
        }) = self.phase
        else {
            return;
        };
        if quiz_step != step {
            return;
        }
        stage.view.show_symmetry_overlay(false);
        self.finish_step(stage);
    }

    fn finish_step<P: Presenter, R: Rng>(&mut self, stage: &mut Stage<P, R>) {
        stage.state.complete_step();
        stage.sync_progress();
        self.phase = Phase::Settling;
        stage.schedule(PHASE_SETTLE_MS, Task::Advance);
    }

    fn enter_selection<P: Presenter, R: Rng>(&mut self, stage: &mut Stage<P, R>) {
        stage.state.selection_phase = true;
        self.round.selection.clear();
        self.phase = Phase::Selection;
        info!(shown = self.round.shown.len(), "selection phase");

        stage.view.show_selection_controls(true);
        stage.view.set_text(
            TextField::GameInstruction,
            "Click the targets in the same order!",
        );
        stage
            .view
            .set_text(TextField::TotalNeeded, &self.round.shown.len().to_string());
        stage.view.set_text(TextField::SelectedCount, "0");
    }

    /// Selects an unselected target or deselects a selected one; later
    /// selections are renumbered so orders stay contiguous.
    pub fn toggle_target<P: Presenter, R: Rng>(&mut self, id: usize, stage: &mut Stage<P, R>) {
        if self.phase != Phase::Selection || !self.round.placements.iter().any(|p| p.id == id) {
            return;
        }

        let selection = &mut self.round.selection;
        if let Some(pos) = selection.iter().position(|e| e.target_id == id) {
            selection.remove(pos);
            stage.view.set_target_selected(id, None);
            for (idx, entry) in selection.iter_mut().enumerate().skip(pos) {
                entry.selection_order = idx + 1;
                stage
                    .view
                    .set_target_selected(entry.target_id, Some(entry.selection_order));
            }
        } else {
            let selection_order = selection.len() + 1;
            selection.push(SelectionEntry {
                target_id: id,
                selection_order,
            });
            stage.view.set_target_selected(id, Some(selection_order));
        }

        stage
            .view
            .set_text(TextField::SelectedCount, &selection.len().to_string());
    }

    pub fn reset_selection<P: Presenter, R: Rng>(&mut self, stage: &mut Stage<P, R>) {
        if self.phase != Phase::Selection {
            return;
        }
        for entry in self.round.selection.drain(..) {
            stage.view.set_target_selected(entry.target_id, None);
        }
        stage.view.set_text(TextField::SelectedCount, "0");
    }

    pub fn score(&self) -> Result<ScoreResult, EvaluationError> {
        if self.phase != Phase::Selection {
            return Err(EvaluationError::NotInSelection);
        }
        scoring::evaluate(
            &self.round.shown,
            &self.round.selection,
            &self.round.symmetry_results,
        )
    }

    /// Session ended mid-round; freezes the round where it stands.
    pub fn end<P: Presenter, R: Rng>(&mut self, stage: &mut Stage<P, R>) {
        if let Phase::Show { target, .. } = self.phase {
            stage.view.set_target_active(target, false);
        }
        stage.view.show_symmetry_overlay(false);
        stage.view.show_selection_controls(false);
        self.phase = Phase::Ended;
    }

    pub fn reset<P: Presenter, R: Rng>(&mut self, stage: &mut Stage<P, R>) {
        stage.view.show_symmetry_overlay(false);
        stage.view.show_selection_controls(false);
        stage.view.render_board(&[]);
        self.round = Round::default();
        self.phase = Phase::Idle;
    }
}
