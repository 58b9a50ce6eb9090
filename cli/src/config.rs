use std::path::{Path, PathBuf};

use mineterm_core::{CellCount, Coord, GameConfig, MAX_DIMENSION, mult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Player settings, loadable from TOML. Missing keys take the beginner defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
    pub save_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_game(GameConfig::beginner())
    }
}

impl Config {
    pub const DEFAULT_SAVE_FILE: &'static str = "savefile";

    pub fn from_game(game: GameConfig) -> Self {
        Self {
            width: game.width(),
            height: game.height(),
            mines: game.mines,
            save_file: PathBuf::from(Self::DEFAULT_SAVE_FILE),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but an absent file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn set_game(&mut self, game: GameConfig) {
        self.width = game.width();
        self.height = game.height();
        self.mines = game.mines;
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Validation(
                "width and height must be > 0".into(),
            ));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(ConfigError::Validation(format!(
                "width and height must be <= {MAX_DIMENSION}"
            )));
        }
        if self.mines == 0 {
            return Err(ConfigError::Validation("mines must be > 0".into()));
        }
        if self.mines > mult(self.width, self.height) {
            return Err(ConfigError::Validation(format!(
                "{} mines do not fit on a {}x{} board",
                self.mines, self.width, self.height
            )));
        }
        if self.save_file.as_os_str().is_empty() {
            return Err(ConfigError::Validation("save_file must not be empty".into()));
        }
        Ok(())
    }

    pub fn game(&self) -> Result<GameConfig, ConfigError> {
        self.validate()?;
        GameConfig::try_new((self.width, self.height), self.mines)
            .map_err(|err| ConfigError::Validation(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_beginner() {
        let config = Config::default();
        assert_eq!(config.game().unwrap(), GameConfig::beginner());
        assert_eq!(config.save_file, PathBuf::from("savefile"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mineterm.toml");
        std::fs::write(&path, "width = 30\nmines = 50\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.width, 30);
        assert_eq!(config.height, 9);
        assert_eq!(config.mines, 50);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = Config::default();
        config.mines = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = Config::default();
        config.mines = 82;
        assert!(matches!(config.game(), Err(ConfigError::Validation(_))));

        let mut config = Config::default();
        config.height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mineterm.toml");
        std::fs::write(&path, "width = \"wide\"\n").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
