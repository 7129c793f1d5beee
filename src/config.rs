//! Game configuration.
//!
//! Tunables shared by every session a front end creates: default roster
//! size, team size, and the fatality and feast chance curves. Read from a
//! JSON file; missing fields take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::{ChanceCurve, EventResolver};
use crate::game::GameError;

/// Errors that can occur when reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] GameError),
}

/// Tunables applied to new sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGameConfig")]
pub struct GameConfig {
    /// Roster size used when `newgame` omits one.
    pub default_max_players: usize,
    /// Members per team at game start.
    pub team_size: usize,
    pub fatality: ChanceCurve,
    pub feast: ChanceCurve,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            default_max_players: 24,
            team_size: 2,
            fatality: ChanceCurve::fatality(),
            feast: ChanceCurve::feast(),
        }
    }
}

/// Config file layout. Every field is optional; curves may be partial.
#[derive(Deserialize)]
struct RawGameConfig {
    default_max_players: Option<usize>,
    team_size: Option<usize>,
    fatality: Option<RawCurve>,
    feast: Option<RawCurve>,
}

#[derive(Deserialize)]
struct RawCurve {
    per_day_pct: Option<f64>,
    floor_pct: Option<f64>,
    cap_pct: Option<f64>,
}

impl RawCurve {
    /// Fills the missing fields from `base`.
    fn over(self, base: ChanceCurve) -> ChanceCurve {
        ChanceCurve {
            per_day_pct: self.per_day_pct.unwrap_or(base.per_day_pct),
            floor_pct: self.floor_pct.unwrap_or(base.floor_pct),
            cap_pct: self.cap_pct.unwrap_or(base.cap_pct),
        }
    }
}

impl From<RawGameConfig> for GameConfig {
    fn from(raw: RawGameConfig) -> Self {
        let defaults = GameConfig::default();
        GameConfig {
            default_max_players: raw
                .default_max_players
                .unwrap_or(defaults.default_max_players),
            team_size: raw.team_size.unwrap_or(defaults.team_size),
            fatality: raw
                .fatality
                .map_or(defaults.fatality, |c| c.over(defaults.fatality)),
            feast: raw.feast.map_or(defaults.feast, |c| c.over(defaults.feast)),
        }
    }
}

impl GameConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig = serde_json::from_str(&json).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.default_max_players == 0 {
            return Err(GameError::InvalidConfiguration(
                "default max players must be positive".to_string(),
            ));
        }
        if self.team_size == 0 {
            return Err(GameError::InvalidConfiguration(
                "team size must be positive".to_string(),
            ));
        }
        self.fatality.validate("fatality")?;
        self.feast.validate("feast")
    }

    /// Builds the resolver for these curves.
    pub fn resolver(&self) -> Result<EventResolver, GameError> {
        EventResolver::new(self.fatality, self.feast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_max_players, 24);
        assert_eq!(config.team_size, 2);
        assert_eq!(config.fatality.percent(0), 1.0);
        assert_eq!(config.feast.percent(100), 20.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "team_size": 3, "feast": { "cap_pct": 50.0 } }"#).unwrap();
        assert_eq!(config.team_size, 3);
        assert_eq!(config.default_max_players, 24);
        assert_eq!(config.feast.cap_pct, 50.0);
        assert_eq!(config.feast.floor_pct, 1.0);
        assert_eq!(config.feast.per_day_pct, 5.0);
        assert_eq!(config.feast.percent(1), 5.0);
        assert_eq!(config.fatality, ChanceCurve::fatality());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_curves_keep_their_own_slope() {
        let config: GameConfig = serde_json::from_str(
            r#"{ "fatality": { "floor_pct": 2.0 }, "feast": { "floor_pct": 2.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.fatality.per_day_pct, 10.0);
        assert_eq!(config.feast.per_day_pct, 5.0);
        assert_eq!(config.fatality.percent(0), 2.0);
        assert_eq!(config.feast.percent(3), 15.0);
    }

    #[test]
    fn empty_json_is_the_default() {
        let config: GameConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn zero_team_size_is_invalid() {
        let config = GameConfig {
            team_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GameError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn bad_curve_is_invalid() {
        let config = GameConfig {
            fatality: ChanceCurve::new(10.0, 40.0, 20.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.resolver().is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = GameConfig::load(Path::new("/nonexistent/hgames.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
