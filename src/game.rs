use rand::Rng;
use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, ClockRun, TickOutcome};
use crate::config::{Config, ConfigChange, CLOCK_TICK_MS, START_DELAY_MS};
use crate::presenter::{format_timer, Presenter, TextField};
use crate::progression::{self, Decision};
use crate::scoring::{EvaluationError, ScoreResult};
use crate::sequence::{Phase, Round, Scheduled, SequenceScheduler, Stage, Task};
use crate::session::SessionState;
use crate::symmetry::SymmetryPattern;

/// Player input, already decoded from whatever device produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameInput {
    StartRequested,
    TargetClicked(usize),
    SymmetryAnswered(bool),
    Submit,
    /// Clears the current selection.
    ResetSelection,
    /// Back to the start screen at level 1.
    Restart,
    PauseToggle,
    ConfigChanged(ConfigChange),
}

/// One running game: session state, countdown and phase machine behind a
/// single thread of control. Time only moves through [`Game::advance_time`].
#[derive(Debug)]
pub struct Game<P: Presenter, R: Rng> {
    stage: Stage<P, R>,
    scheduler: SequenceScheduler,
    clock: Clock,
    last_score: Option<ScoreResult>,
}

impl<P: Presenter, R: Rng> Game<P, R> {
    pub fn new(config: Config, view: P, rng: R) -> Self {
        Self::with_scheduler(config, view, rng, SequenceScheduler::default())
    }

    pub fn with_scheduler(config: Config, view: P, rng: R, scheduler: SequenceScheduler) -> Self {
        let mut clock = Clock::new();
        clock.on_expire(|| info!("session clock expired"));
        let mut game = Self {
            stage: Stage::new(config, view, rng),
            scheduler,
            clock,
            last_score: None,
        };
        game.show_start_screen();
        game
    }

    pub fn state(&self) -> &SessionState {
        &self.stage.state
    }

    pub fn config(&self) -> &Config {
        &self.stage.config
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn round(&self) -> &Round {
        self.scheduler.round()
    }

    pub fn current_pattern(&self) -> Option<&'static SymmetryPattern> {
        self.scheduler.current_pattern()
    }

    pub fn last_score(&self) -> Option<ScoreResult> {
        self.last_score
    }

    pub fn now_ms(&self) -> u64 {
        self.stage.timeline.now_ms()
    }

    pub fn view(&self) -> &P {
        &self.stage.view
    }

    pub fn view_mut(&mut self) -> &mut P {
        &mut self.stage.view
    }

    pub fn handle(&mut self, input: GameInput) {
        let always_allowed = matches!(
            input,
            GameInput::PauseToggle | GameInput::Restart | GameInput::ConfigChanged(_)
        );
        if self.stage.state.paused && !always_allowed {
            debug!(?input, "ignored while paused");
            return;
        }

        match input {
            GameInput::StartRequested => self.start(),
            GameInput::TargetClicked(id) => self.scheduler.toggle_target(id, &mut self.stage),
            GameInput::SymmetryAnswered(answer) => {
                if !self.scheduler.answer(answer, &mut self.stage) {
                    trace!(answer, "no open quiz");
                }
            }
            GameInput::Submit => match self.submit() {
                Ok(_) => {}
                Err(EvaluationError::NotInSelection) => debug!("submit outside selection"),
                Err(err) => {
                    warn!(%err, "submission rejected");
                    self.stage.view.set_text(
                        TextField::Message,
                        "No sequence shown, cannot evaluate.",
                    );
                }
            },
            GameInput::ResetSelection => self.scheduler.reset_selection(&mut self.stage),
            GameInput::Restart => self.restart(),
            GameInput::PauseToggle => self.toggle_pause(),
            GameInput::ConfigChanged(change) => {
                self.stage.config.apply(change);
                info!(?change, "config changed");
            }
        }
    }

    /// Moves virtual time forward, running every task that falls due. Paused
    /// games do not move at all.
    pub fn advance_time(&mut self, elapsed_ms: u64) {
        if self.stage.state.paused {
            return;
        }
        let deadline = self.stage.timeline.now_ms().saturating_add(elapsed_ms);
        while let Some(Scheduled { token, task }) = self.stage.timeline.pop_due(deadline) {
            if token != self.stage.token {
                trace!(?task, "dropping stale task");
                continue;
            }
            self.dispatch(task);
        }
        self.stage.timeline.advance_to(deadline);
    }

    fn dispatch(&mut self, task: Task) {
        match task {
            Task::BeginRound => self.begin_round(),
            Task::Advance => self.scheduler.advance(&mut self.stage),
            Task::EndShow { step } => self.scheduler.end_show(step, &mut self.stage),
            Task::QuizTick { step } => self.scheduler.quiz_tick(step, &mut self.stage),
            Task::ClearQuiz { step } => self.scheduler.clear_quiz(step, &mut self.stage),
            Task::ClockTick(run) => self.clock_tick(run),
            Task::Restart => self.restart(),
        }
    }

    pub fn start(&mut self) {
        if self.scheduler.phase() != Phase::Idle {
            debug!(phase = ?self.scheduler.phase(), "start ignored");
            return;
        }
        self.cancel_pending();
        let session_secs = self.stage.config.session_secs;
        self.stage.state.reset_round(session_secs);
        self.scheduler.mark_pending();
        info!(level = self.stage.state.level, "game starting");
        self.stage.schedule(START_DELAY_MS, Task::BeginRound);
    }

    fn begin_round(&mut self) {
        let state = &mut self.stage.state;
        state.active = true;
        state.paused = false;

        let level = state.level;
        self.stage
            .view
            .set_text(TextField::LevelNum, &level.to_string());
        self.stage.view.set_text(TextField::PlayButton, "⏸");

        let run = self.clock.start(self.stage.config.session_secs);
        self.clock_tick(run);
        self.scheduler.begin_round(&mut self.stage);
    }

    fn clock_tick(&mut self, run: ClockRun) {
        match self.clock.tick(run) {
            TickOutcome::Tick(shown) => {
                self.stage.state.time_remaining = self.clock.time_remaining();
                self.stage
                    .view
                    .set_text(TextField::Timer, &format_timer(shown));
                self.stage.schedule(CLOCK_TICK_MS, Task::ClockTick(run));
            }
            // advance_time stands still while paused, so this only happens if a
            // driver ticks the clock by hand; keep the stream alive for resume
            TickOutcome::Paused => self.stage.schedule(CLOCK_TICK_MS, Task::ClockTick(run)),
            TickOutcome::Expired => {
                self.stage.state.time_remaining = 0;
                self.stage.view.set_text(TextField::Timer, &format_timer(0));
                self.end_session("Time's Up!");
            }
            TickOutcome::Stale => trace!("stale clock tick"),
        }
    }

    /// Scores the selection and schedules whatever comes next.
    pub fn submit(&mut self) -> Result<Decision, EvaluationError> {
        let score = self.scheduler.score()?;
        let level = self.stage.state.level;
        let threshold = self.stage.config.level_advancement_threshold;
        let decision = progression::decide(&score, level, self.stage.config.max_level, threshold);
        info!(
            level,
            target = score.target_accuracy,
            symmetry = score.symmetry_accuracy,
            overall = score.overall,
            ?decision,
            "round evaluated"
        );

        self.cancel_pending();
        self.last_score = Some(score);
        self.scheduler.mark_evaluated(decision);
        self.stage.view.show_selection_controls(false);
        self.stage.view.set_text(
            TextField::Message,
            &result_summary(decision, level, &score, threshold, self.stage.config.max_level),
        );

        let session_secs = self.stage.config.session_secs;
        progression::apply(decision, &mut self.stage.state, session_secs);
        let settle = self.stage.config.settle_delay_ms;
        match decision {
            Decision::Advance { next_level } => {
                self.stage.view.set_text(
                    TextField::GameInstruction,
                    &format!("Level {next_level} - Get Ready!"),
                );
                self.stage.schedule(settle, Task::BeginRound);
            }
            Decision::Retry => {
                self.stage.view.set_text(
                    TextField::GameInstruction,
                    &format!("Level {level} - Try Again!"),
                );
                self.stage.schedule(settle, Task::BeginRound);
            }
            Decision::Complete => self.stage.schedule(settle, Task::Restart),
        }
        Ok(decision)
    }

    pub fn restart(&mut self) {
        self.cancel_pending();
        self.stage.state = SessionState::new(self.stage.config.session_secs);
        self.scheduler.reset(&mut self.stage);
        self.show_start_screen();
        info!("session restarted");
    }

    fn end_session(&mut self, message: &str) {
        self.cancel_pending();
        let state = &mut self.stage.state;
        state.active = false;
        state.paused = false;
        state.selection_phase = false;
        self.scheduler.end(&mut self.stage);
        self.stage.view.set_text(TextField::Message, message);
        info!(message, level = self.stage.state.level, "session ended");

        let settle = self.stage.config.settle_delay_ms;
        self.stage.schedule(settle, Task::Restart);
    }

    fn toggle_pause(&mut self) {
        if !self.stage.state.active {
            return;
        }
        let state = &mut self.stage.state;
        state.paused = !state.paused;
        if state.paused {
            self.clock.pause();
            self.stage.view.set_text(TextField::PlayButton, "▶");
            self.stage
                .view
                .set_text(TextField::GameInstruction, "Game Paused");
        } else {
            self.clock.resume();
            self.stage.view.set_text(TextField::PlayButton, "⏸");
            self.stage
                .view
                .set_text(TextField::GameInstruction, "Game Resumed");
        }
        debug!(paused = self.stage.state.paused, "pause toggled");
    }

    /// Every reset path goes through here: stale tasks and the old clock run
    /// can no longer touch the session afterwards.
    fn cancel_pending(&mut self) {
        self.stage.next_round_token();
        self.clock.stop();
    }

    fn show_start_screen(&mut self) {
        let state = &self.stage.state;
        let view = &mut self.stage.view;
        view.set_text(TextField::GameInstruction, "Press Start to Begin!");
        view.set_text(TextField::LevelNum, &state.level.to_string());
        view.set_text(TextField::Timer, &format_timer(state.time_remaining));
        view.set_text(TextField::ProgressText, &state.progress.to_string());
        view.set_progress_bar(state.progress_percent());
        view.set_text(TextField::PlayButton, "▶");
    }
}

fn result_summary(
    decision: Decision,
    level: u32,
    score: &ScoreResult,
    threshold: u32,
    max_level: u32,
) -> String {
    let ScoreResult {
        target_accuracy,
        symmetry_accuracy,
        overall,
    } = score;
    match decision {
        Decision::Advance { next_level } => format!(
            "Excellent! Level {level} Complete! Sequence Memory: {target_accuracy}% \
             Symmetry: {symmetry_accuracy}% Overall: {overall}% - Advancing to level {next_level}!"
        ),
        Decision::Complete => format!(
            "GAME COMPLETED! You've mastered all {max_level} levels! Overall: {overall}%"
        ),
        Decision::Retry => format!(
            "Level {level} - Try Again! Sequence Memory: {target_accuracy}% \
             Symmetry: {symmetry_accuracy}% Overall: {overall}% - Need {threshold}% to advance."
        ),
    }
}
