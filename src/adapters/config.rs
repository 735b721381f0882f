//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over a plain JSON file. A missing file is
//! first-boot: defaults are returned. Saving always validates first —
//! invalid ranges are rejected, never silently clamped.

use std::fs;
use std::path::PathBuf;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::RoomConfig;
use crate::error::Error;

pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for FileConfigStore {
    fn load(&self) -> Result<RoomConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(RoomConfig::default());
            }
            Err(_) => return Err(ConfigError::IoError),
        };

        let config: RoomConfig =
            serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;

        match config.validate() {
            Ok(()) => Ok(config),
            Err(Error::Config(msg)) => Err(ConfigError::ValidationFailed(msg)),
            Err(_) => Err(ConfigError::Corrupted),
        }
    }

    fn save(&self, config: &RoomConfig) -> Result<(), ConfigError> {
        match config.validate() {
            Ok(()) => {}
            Err(Error::Config(msg)) => return Err(ConfigError::ValidationFailed(msg)),
            Err(_) => return Err(ConfigError::Corrupted),
        }
        let json =
            serde_json::to_string_pretty(config).map_err(|_| ConfigError::IoError)?;
        fs::write(&self.path, json).map_err(|_| ConfigError::IoError)
    }
}
