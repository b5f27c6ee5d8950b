//! Input plumbing for the terminal loop. Every source ends in an mpsc channel;
//! the runner waits on it for at most one frame and reports how much wall time
//! went by, which is what the game is advanced with.

use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};

#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    /// Nothing arrived within one frame.
    Tick,
}

pub trait EventSource {
    /// Next event, or `None` once `wait` has passed without one.
    fn next_event(&self, wait: Duration) -> Option<GameEvent>;
}

/// Events delivered over a channel. Tests feed one directly;
/// [`terminal_events`] feeds one from crossterm.
pub struct ChannelEvents {
    rx: Receiver<GameEvent>,
}

impl ChannelEvents {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEvents {
    fn next_event(&self, wait: Duration) -> Option<GameEvent> {
        self.rx.recv_timeout(wait).ok()
    }
}

/// Keeps what the game reacts to. Key releases and repeats are dropped so a
/// press is never counted twice on terminals that report them.
pub fn translate(raw: Event) -> Option<GameEvent> {
    match raw {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(GameEvent::Key(key)),
        Event::Mouse(mouse) => Some(GameEvent::Mouse(mouse)),
        Event::Resize(..) => Some(GameEvent::Resize),
        _ => None,
    }
}

/// Spawns the blocking crossterm reader. The thread exits once the receiving
/// side is dropped or the terminal stops producing events.
pub fn terminal_events() -> ChannelEvents {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        while let Ok(raw) = event::read() {
            let Some(ev) = translate(raw) else {
                continue;
            };
            if tx.send(ev).is_err() {
                break;
            }
        }
    });
    ChannelEvents::new(rx)
}

/// One loop iteration's worth of input.
#[derive(Debug)]
pub struct Step {
    pub event: GameEvent,
    /// Wall time since the previous step (or since the runner was built).
    pub elapsed_ms: u64,
}

pub struct Runner<E: EventSource> {
    events: E,
    frame: Duration,
    last_step: Instant,
}

impl<E: EventSource> Runner<E> {
    pub fn new(events: E, frame: Duration) -> Self {
        Self {
            events,
            frame,
            last_step: Instant::now(),
        }
    }

    pub fn step(&mut self) -> Step {
        let event = self.events.next_event(self.frame).unwrap_or(GameEvent::Tick);
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.last_step).as_millis() as u64;
        self.last_step = now;
        Step { event, elapsed_ms }
    }
}
