use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "mathdash";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("mathdash_config.json"))
    }

    /// State lives under `~/.local/state/mathdash` when HOME is set
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            Self::project().map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("stats.db"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("mathdash.log"))
    }
}
