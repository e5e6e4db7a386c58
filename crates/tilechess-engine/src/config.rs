//! Engine configuration loaded from TOML.
//!
//! All fields are optional; a missing file or a missing field falls back to
//! the defaults below.
//!
//! ```toml
//! max_search_depth = 6
//! worker_reserve = 1
//! start_fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tilechess_core::FenError;

use crate::scheduler::worker_count;
use crate::Position;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// `max_search_depth` must be at least 1.
    #[error("max_search_depth must be at least 1")]
    ZeroSearchDepth,
    /// `start_fen` does not describe a playable position.
    #[error("Invalid start_fen: {0}")]
    InvalidStartFen(#[from] FenError),
}

/// Tunables of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Deepest search the engine may be asked for. Defaults to 6.
    #[serde(default = "default_max_search_depth")]
    pub max_search_depth: u8,
    /// Cores left free for the interactive thread. Defaults to 1.
    #[serde(default = "default_worker_reserve")]
    pub worker_reserve: usize,
    /// Position new games start from. Defaults to the standard start.
    #[serde(default)]
    pub start_fen: Option<String>,
}

fn default_max_search_depth() -> u8 {
    6
}

fn default_worker_reserve() -> usize {
    1
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_search_depth: default_max_search_depth(),
            worker_reserve: default_worker_reserve(),
            start_fen: None,
        }
    }
}

impl EngineConfig {
    /// Loads `engine.toml` from the current directory, or the defaults if it
    /// does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads the configuration at `path`, or the defaults if it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// [`ConfigError::ParseError`] if it is not valid TOML, and a validation
    /// error if a value is out of range.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::info!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_search_depth == 0 {
            return Err(ConfigError::ZeroSearchDepth);
        }
        if let Some(fen) = &self.start_fen {
            Position::from_fen(fen)?;
        }
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// Currently returns `engine.toml` in the current working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("engine.toml")
    }

    /// Depth used for interactive searches: half the configured maximum,
    /// at least one ply.
    pub fn search_depth(&self) -> u8 {
        (self.max_search_depth / 2).max(1)
    }

    /// Worker threads for the job scheduler.
    pub fn worker_threads(&self) -> usize {
        worker_count(self.worker_reserve)
    }

    /// The configured start position, or the standard one.
    pub fn start_position(&self) -> Result<Position, ConfigError> {
        match &self.start_fen {
            Some(fen) => Ok(Position::from_fen(fen)?),
            None => Ok(Position::startpos()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_search_depth, 6);
        assert_eq!(config.worker_reserve, 1);
        assert_eq!(config.start_fen, None);
        assert_eq!(config.search_depth(), 3);
        assert!(config.worker_threads() >= 1);
    }

    #[test]
    fn test_parse_full_config() {
        let config = EngineConfig::parse(
            r#"
max_search_depth = 8
worker_reserve = 2
start_fen = "4k3/8/8/8/8/8/8/4K3 w - - 0 1"
"#,
        )
        .unwrap();
        assert_eq!(config.max_search_depth, 8);
        assert_eq!(config.worker_reserve, 2);
        assert_eq!(config.search_depth(), 4);
        assert_eq!(
            config.start_position().unwrap().to_fen(),
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1"
        );
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = EngineConfig::parse("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.start_position().unwrap(), Position::startpos());
    }

    #[test]
    fn test_search_depth_floor() {
        let config = EngineConfig {
            max_search_depth: 1,
            ..Default::default()
        };
        assert_eq!(config.search_depth(), 1);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            EngineConfig::parse("max_search_depth = 0"),
            Err(ConfigError::ZeroSearchDepth)
        ));
        assert!(matches!(
            EngineConfig::parse(r#"start_fen = "8/8/8/8/8/8/8/8 w - - 0 1""#),
            Err(ConfigError::InvalidStartFen(_))
        ));
        assert!(matches!(
            EngineConfig::parse("max_search_depth = \"deep\""),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_search_depth = 4").unwrap();
        let config = EngineConfig::load_from(file.path()).unwrap();
        assert_eq!(config.max_search_depth, 4);
        assert_eq!(config.worker_reserve, 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_from(&dir.path().join("engine.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
