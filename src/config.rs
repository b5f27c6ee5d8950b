use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::session::DEFAULT_SESSION_SECS;

pub const MIN_BALL_DISPLAY_MS: u64 = 200;
pub const MIN_SYMMETRY_MS: u64 = 1000;

/// Delay between a start request and the first phase.
pub const START_DELAY_MS: u64 = 120;
/// Pause between two phases of a round.
pub const PHASE_SETTLE_MS: u64 = 300;
/// Time the answered quiz stays up before the overlay closes.
pub const QUIZ_CLEAR_MS: u64 = 300;
pub const CLOCK_TICK_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub ball_display_time_ms: u64,
    pub symmetry_time_ms: u64,
    pub level_advancement_threshold: u32,
    pub max_level: u32,
    pub session_secs: u32,
    /// Delay before the next round after advance, retry, completion or time-out.
    pub settle_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ball_display_time_ms: 1500,
            symmetry_time_ms: 3000,
            level_advancement_threshold: 70,
            max_level: 100,
            session_secs: DEFAULT_SESSION_SECS,
            settle_delay_ms: 1000,
        }
    }
}

impl Config {
    pub fn normalized(mut self) -> Self {
        self.ball_display_time_ms = self.ball_display_time_ms.max(MIN_BALL_DISPLAY_MS);
        self.symmetry_time_ms = self.symmetry_time_ms.max(MIN_SYMMETRY_MS);
        self.level_advancement_threshold = self.level_advancement_threshold.min(100);
        self.max_level = self.max_level.max(1);
        self.session_secs = self.session_secs.max(1);
        self
    }

    /// Whole seconds the quiz countdown runs for.
    pub fn symmetry_countdown_secs(&self) -> u32 {
        (self.symmetry_time_ms.div_ceil(1000)).max(1) as u32
    }

    pub fn apply(&mut self, change: ConfigChange) {
        match change {
            ConfigChange::BallDisplayTime(ms) => {
                self.ball_display_time_ms = ms.max(MIN_BALL_DISPLAY_MS)
            }
            ConfigChange::SymmetryTime(ms) => self.symmetry_time_ms = ms.max(MIN_SYMMETRY_MS),
        }
    }
}

/// Runtime adjustments from the settings controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    BallDisplayTime(u64),
    SymmetryTime(u64),
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = crate::app_dirs::AppDirs::config_path()
            .unwrap_or_else(|| PathBuf::from("symspan_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg.normalized();
            }
            tracing::warn!(path = %self.path.display(), "ignoring unreadable config");
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
