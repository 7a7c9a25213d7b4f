use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default cap on undo history entries.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Default tracing filter when `TABULA_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "tabula=info,warn";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // History
    /// `null` keeps every entry.
    #[serde(rename = "history.maxDepth")]
    pub history_max_depth: Option<usize>,

    // Logging
    #[serde(rename = "log.filter")]
    pub log_filter: String,

    // Replay
    /// Treat rejected actions and dropped history entries as failures.
    #[serde(rename = "replay.strict")]
    pub replay_strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_max_depth: Some(DEFAULT_HISTORY_DEPTH),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            replay_strict: false,
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Undo history: entries kept before the oldest is dropped (null = unlimited)
    "history.maxDepth": 100,

    // Tracing filter, overridden by TABULA_LOG
    "log.filter": "tabula=info,warn",

    // tabula replay: exit non-zero on rejected actions or dropped entries
    "replay.strict": false
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tabula");
        config_dir.join("settings.json")
    }

    /// Load settings from the user config dir, writing a commented default
    /// file on first run.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            Self::create_default_file(&path);
            return Self::default();
        }
        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read settings, using defaults");
                return Self::default();
            }
        };

        match Self::parse(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot parse settings, using defaults");
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io { path: parent.to_path_buf(), source })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })
    }

    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "cannot create config directory");
                return;
            }
        }
        if let Err(e) = fs::write(path, DEFAULT_FILE) {
            warn!(path = %path.display(), error = %e, "cannot write default settings");
        }
    }
}
