mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, MouseButton, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use symspan::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    game::{Game, GameInput},
    keymap::{command_for_key, Command},
    runtime::{terminal_events, GameEvent, Runner, Step},
    view::BoardView,
};
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 50;

/// memorize target positions between mirror-symmetry judgements
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal memory challenge: targets light up one at a time between timed mirror-symmetry questions, then you click them back in order. Score well enough and the board gets denser."
)]
pub struct Cli {
    /// how long each target stays highlighted, in milliseconds (min 200)
    #[clap(long = "ball-ms")]
    ball_display_time_ms: Option<u64>,

    /// time allowed per symmetry question, in milliseconds (min 1000)
    #[clap(long = "symmetry-ms")]
    symmetry_time_ms: Option<u64>,

    /// overall percentage needed to advance a level
    #[clap(short = 't', long)]
    threshold: Option<u32>,

    /// last level of the game
    #[clap(long)]
    max_level: Option<u32>,

    /// session countdown per round, in seconds
    #[clap(short = 's', long)]
    session_secs: Option<u32>,

    /// pause before the next round starts, in milliseconds
    #[clap(long = "settle-ms")]
    settle_delay_ms: Option<u64>,

    /// seed for a reproducible game
    #[clap(long)]
    seed: Option<u64>,

    /// settings file to read (defaults to the platform config dir)
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// write the effective settings back to the settings file
    #[clap(long)]
    save_config: bool,

    /// log file (defaults to ~/.local/state/symspan/symspan.log)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Command-line values win over the settings file.
    fn apply_to(&self, mut cfg: Config) -> Config {
        if let Some(ms) = self.ball_display_time_ms {
            cfg.ball_display_time_ms = ms;
        }
        if let Some(ms) = self.symmetry_time_ms {
            cfg.symmetry_time_ms = ms;
        }
        if let Some(threshold) = self.threshold {
            cfg.level_advancement_threshold = threshold;
        }
        if let Some(max_level) = self.max_level {
            cfg.max_level = max_level;
        }
        if let Some(secs) = self.session_secs {
            cfg.session_secs = secs;
        }
        if let Some(ms) = self.settle_delay_ms {
            cfg.settle_delay_ms = ms;
        }
        cfg.normalized()
    }
}

fn init_logging(path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let Some(path) = path.or_else(AppDirs::log_path) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("symspan=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.log_file.clone())?;

    let store = cli
        .config
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default();
    let config = cli.apply_to(store.load());
    if cli.save_config {
        store.save(&config)?;
    }
    tracing::info!(?config, path = %store.path().display(), "starting");

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = Game::new(config, BoardView::new(), rng);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut game);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    game: &mut Game<BoardView, StdRng>,
) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(terminal_events(), Duration::from_millis(TICK_RATE_MS));

    loop {
        let mut board = Rect::default();
        terminal.draw(|f| board = ui::draw(f, game.view_mut()))?;

        let Step { event, elapsed_ms } = runner.step();
        game.advance_time(elapsed_ms);

        match event {
            GameEvent::Tick | GameEvent::Resize => {}
            GameEvent::Key(key) => match command_for_key(&key, game.config()) {
                Some(Command::Quit) => break,
                Some(Command::Game(input)) => game.handle(input),
                None => {}
            },
            GameEvent::Mouse(mouse) => {
                if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
                    continue;
                }
                let inside = mouse.column >= board.x
                    && mouse.column < board.x + board.width
                    && mouse.row >= board.y
                    && mouse.row < board.y + board.height;
                if !inside {
                    continue;
                }
                let hit = game
                    .view()
                    .target_at_cell(mouse.column - board.x, mouse.row - board.y);
                if let Some(id) = hit {
                    game.handle(GameInput::TargetClicked(id));
                }
            }
        }
    }

    Ok(())
}
