use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app_dirs::AppDirs;
use crate::modes::{InputMethod, DEFAULT_MODE_ID};
use crate::operation::Difficulty;

/// User preferences plus the quick-play state saved after every game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub default_difficulty: Difficulty,
    pub default_duration_secs: u64,
    pub input_method: InputMethod,
    pub last_played_mode_id: Option<String>,
    pub last_played_difficulty: Option<Difficulty>,
    pub last_played_duration_secs: Option<u64>,
    pub auto_update: bool,
    pub skip_quit_confirmation: bool,
    pub onboarding_done: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_difficulty: Difficulty::Medium,
            default_duration_secs: 60,
            input_method: InputMethod::Typing,
            last_played_mode_id: None,
            last_played_difficulty: None,
            last_played_duration_secs: None,
            auto_update: true,
            skip_quit_confirmation: false,
            onboarding_done: false,
        }
    }
}

/// The last game's mode, difficulty and duration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastPlayed {
    pub mode_id: String,
    pub difficulty: Difficulty,
    pub duration: Duration,
}

impl Config {
    pub fn has_last_played(&self) -> bool {
        self.last_played().is_some()
    }

    pub fn last_played(&self) -> Option<LastPlayed> {
        let mode_id = self.last_played_mode_id.as_ref().filter(|id| !id.is_empty())?;
        let difficulty = self.last_played_difficulty?;
        let secs = self.last_played_duration_secs.filter(|s| *s > 0)?;
        Some(LastPlayed {
            mode_id: mode_id.clone(),
            difficulty,
            duration: Duration::from_secs(secs),
        })
    }

    pub fn set_last_played(&mut self, mode_id: &str, difficulty: Difficulty, duration: Duration) {
        self.last_played_mode_id = Some(mode_id.to_string());
        self.last_played_difficulty = Some(difficulty);
        self.last_played_duration_secs = Some(duration.as_secs());
    }

    pub fn default_duration(&self) -> Duration {
        Duration::from_secs(self.default_duration_secs)
    }

    /// Settings written when the first-run flow is skipped
    pub fn skip_onboarding(&mut self) {
        self.onboarding_done = true;
        self.set_last_played(DEFAULT_MODE_ID, Difficulty::Easy, Duration::from_secs(60));
    }
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
        Self {
            path: AppDirs::config_path(),
        }
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

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files fall back to defaults
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "ignoring invalid config: {err}");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        // atomic replace
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)
    }
}

/// In-memory store for tests and for runs where the config dir is unusable
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    cfg: std::cell::RefCell<Config>,
}

impl MemoryConfigStore {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg: std::cell::RefCell::new(cfg),
        }
    }

    pub fn current(&self) -> Config {
        self.cfg.borrow().clone()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Config {
        self.current()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        *self.cfg.borrow_mut() = cfg.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn save_and_load_last_played() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let mut cfg = Config::default();
        cfg.set_last_played("cubes", Difficulty::Hard, Duration::from_secs(90));
        cfg.skip_quit_confirmation = true;
        store.save(&cfg).unwrap();

        let loaded = store.load();
        assert_eq!(cfg, loaded);
        assert_eq!(
            loaded.last_played(),
            Some(LastPlayed {
                mode_id: "cubes".into(),
                difficulty: Difficulty::Hard,
                duration: Duration::from_secs(90),
            })
        );
    }

    #[test]
    fn missing_or_corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"last_played_mode_id":"division"}"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.last_played_mode_id.as_deref(), Some("division"));
        assert!(cfg.auto_update);
        assert_eq!(cfg.input_method, InputMethod::Typing);
        assert!(!cfg.has_last_played());
    }

    #[test]
    fn input_method_is_stored_by_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"input_method":"multiple_choice"}"#).unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load().input_method, InputMethod::MultipleChoice);
    }

    #[test]
    fn has_last_played_needs_all_fields() {
        let mut cfg = Config::default();
        assert!(!cfg.has_last_played());

        cfg.last_played_mode_id = Some("addition".into());
        cfg.last_played_difficulty = Some(Difficulty::Easy);
        assert!(!cfg.has_last_played());

        cfg.last_played_duration_secs = Some(0);
        assert!(!cfg.has_last_played());

        cfg.last_played_duration_secs = Some(30);
        assert!(cfg.has_last_played());

        cfg.last_played_mode_id = Some(String::new());
        assert!(!cfg.has_last_played());
    }

    #[test]
    fn skipping_onboarding_seeds_quick_play() {
        let mut cfg = Config::default();
        cfg.skip_onboarding();
        assert!(cfg.onboarding_done);
        let last = cfg.last_played().unwrap();
        assert_eq!(last.mode_id, "addition");
        assert_eq!(last.difficulty, Difficulty::Easy);
    }
}
