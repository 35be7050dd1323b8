//! Runtime configuration, read from the environment at startup.
//!
//! A `.env` file in the working directory is honoured outside of tests.

use std::path::PathBuf;
use std::time::Duration;

use crate::application::gesture::{GestureConfig, MOVE_TOLERANCE};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub preferences_path: PathBuf,
    pub speech_language: String,
    pub log_file: PathBuf,
    /// Horizontal drag, in terminal cells, needed to toggle or delete a task.
    pub swipe_threshold: f32,
    pub long_press: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://solo-dilo.db".to_string(),
            preferences_path: PathBuf::from("solo-dilo.prefs.json"),
            speech_language: "es-ES".to_string(),
            log_file: PathBuf::from("solo-dilo.log"),
            swipe_threshold: 8.0,
            long_press: Duration::from_millis(500),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let swipe_threshold = match lookup("SWIPE_THRESHOLD") {
            Some(raw) => raw
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or_else(|| ConfigError::InvalidValue("SWIPE_THRESHOLD".into(), format!("'{raw}' is not a positive number")))?,
            None => defaults.swipe_threshold,
        };

        let long_press = match lookup("LONG_PRESS_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| ConfigError::InvalidValue("LONG_PRESS_MS".into(), e.to_string()))?,
            None => defaults.long_press,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            preferences_path: lookup("PREFERENCES_PATH").map(PathBuf::from).unwrap_or(defaults.preferences_path),
            speech_language: lookup("SPEECH_LANG").unwrap_or(defaults.speech_language),
            log_file: lookup("LOG_FILE").map(PathBuf::from).unwrap_or(defaults.log_file),
            swipe_threshold,
            long_press,
        })
    }

    pub fn gesture(&self) -> GestureConfig {
        GestureConfig {
            swipe_threshold: self.swipe_threshold,
            long_press_delay: self.long_press,
            move_tolerance: MOVE_TOLERANCE.min(self.swipe_threshold / 4.0),
        }
    }
}
