use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::error::ConfigError;
use crate::metrics::CHARS_PER_WORD;
use crate::session::{SessionConfig, DEFAULT_TICK_RATE_MS};
use crate::style::StyleProfile;
use crate::word_picker::DEFAULT_SAMPLE_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub number_of_words: usize,
    pub tick_rate_ms: u64,
    pub word_list: Option<PathBuf>,
    pub bundled_list: String,
    pub username: Option<String>,
    pub record_sessions: bool,
    pub style: StyleProfile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_words: DEFAULT_SAMPLE_SIZE,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            word_list: None,
            bundled_list: "english".to_string(),
            username: None,
            record_sessions: true,
            style: StyleProfile::default(),
        }
    }
}

impl Config {
    /// Engine settings; a zero tick rate falls back to the default period
    pub fn session_config(&self) -> SessionConfig {
        let tick_rate_ms = if self.tick_rate_ms == 0 {
            tracing::warn!("tick_rate_ms of 0 ignored");
            DEFAULT_TICK_RATE_MS
        } else {
            self.tick_rate_ms
        };
        SessionConfig {
            tick_period: Duration::from_millis(tick_rate_ms),
            chars_per_word: CHARS_PER_WORD,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
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

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "unreadable config, using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::CaretStyle;
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
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = Config {
            number_of_words: 40,
            tick_rate_ms: 100,
            word_list: Some(PathBuf::from("/tmp/words.json")),
            bundled_list: "english".into(),
            username: Some("ada".into()),
            record_sessions: false,
            style: StyleProfile::default().with_caret(CaretStyle::Block),
        };
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"username":"ada","style":{"caret":"outline"}}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.username.as_deref(), Some("ada"));
        assert_eq!(cfg.style.caret, CaretStyle::Outline);
        assert_eq!(cfg.number_of_words, 15);
        assert_eq!(cfg.tick_rate_ms, 200);
    }

    #[test]
    fn session_config_from_tick_rate() {
        let cfg = Config {
            tick_rate_ms: 100,
            ..Config::default()
        };
        assert_eq!(
            cfg.session_config().tick_period,
            Duration::from_millis(100)
        );

        let zero = Config {
            tick_rate_ms: 0,
            ..Config::default()
        };
        assert_eq!(
            zero.session_config().tick_period,
            Duration::from_millis(200)
        );
    }
}
