use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "symspan").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Log file under `$HOME/.local/state/symspan`, falling back to the
    /// platform's local data dir.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("symspan");
            Some(state_dir.join("symspan.log"))
        } else {
            ProjectDirs::from("", "", "symspan")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("symspan.log"))
        }
    }
}
