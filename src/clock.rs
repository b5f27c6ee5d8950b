//! Session countdown. The clock does not own a timer thread: whoever drives it
//! delivers one `tick(run)` per second, tagged with the run id returned by
//! [`Clock::start`]. Restarting bumps the id, so ticks from an older run are
//! rejected and only one tick stream is ever live.

/// Identifies one start..stop span of the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockRun(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Reports the value before decrementing.
    Tick(u32),
    /// Reached zero; the clock has stopped itself.
    Expired,
    /// Running but paused; keep the stream alive without counting.
    Paused,
    /// Tick from a stopped or superseded run; the stream should end.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockState {
    Stopped,
    Running,
    Paused,
}

type TickListener = Box<dyn FnMut(u32)>;
type ExpireListener = Box<dyn FnMut()>;

pub struct Clock {
    time_remaining: u32,
    state: ClockState,
    run: u64,
    tick_listeners: Vec<TickListener>,
    expire_listeners: Vec<ExpireListener>,
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("time_remaining", &self.time_remaining)
            .field("state", &self.state)
            .field("run", &self.run)
            .finish_non_exhaustive()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            time_remaining: 0,
            state: ClockState::Stopped,
            run: 0,
            tick_listeners: Vec::new(),
            expire_listeners: Vec::new(),
        }
    }

    pub fn on_tick(&mut self, listener: impl FnMut(u32) + 'static) {
        self.tick_listeners.push(Box::new(listener));
    }

    pub fn on_expire(&mut self, listener: impl FnMut() + 'static) {
        self.expire_listeners.push(Box::new(listener));
    }

    /// Cancels any current run before starting a fresh countdown.
    pub fn start(&mut self, seconds: u32) -> ClockRun {
        self.stop();
        self.time_remaining = seconds;
        self.state = ClockState::Running;
        ClockRun(self.run)
    }

    pub fn stop(&mut self) {
        self.run += 1;
        self.state = ClockState::Stopped;
    }

    pub fn pause(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == ClockState::Paused {
            self.state = ClockState::Running;
        }
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == ClockState::Paused
    }

    pub fn tick(&mut self, run: ClockRun) -> TickOutcome {
        if run.0 != self.run || self.state == ClockState::Stopped {
            return TickOutcome::Stale;
        }
        if self.state == ClockState::Paused {
            return TickOutcome::Paused;
        }

        let shown = self.time_remaining;
        for listener in &mut self.tick_listeners {
            listener(shown);
        }

        if shown > 0 {
            self.time_remaining -= 1;
            return TickOutcome::Tick(shown);
        }

        self.stop();
        for listener in &mut self.expire_listeners {
            listener();
        }
        TickOutcome::Expired
    }
}
