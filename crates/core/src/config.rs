//! Game configuration
//!
//! Defaults come from the constants in `types`. A JSON file and environment
//! variables can override them:
//!
//! - `SPECIES_MATCH_CONFIG`: path to a JSON config file, loaded first
//! - `SPECIES_MATCH_WIDTH` / `SPECIES_MATCH_HEIGHT`: grid size
//! - `SPECIES_MATCH_MAX_MOVES`: move budget per location
//! - `SPECIES_MATCH_SEED`: RNG seed
//!
//! # Examples
//!
//! ```
//! use species_match_core::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "width": 6, "max_moves": 12 }"#).unwrap();
//! assert_eq!(config.width, 6);
//! assert_eq!(config.height, 8);
//! assert_eq!(config.max_moves, 12);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rng::CategoryWeights;
use crate::scoring::ScoringRules;
use crate::types::{
    DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_MAX_MOVES, MAX_GRID_SIDE, MIN_GRID_SIDE,
};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub max_moves: u32,
    pub seed: u32,
    /// Initial category weights; `None` is uniform
    pub weights: Option<CategoryWeights>,
    pub rules: ScoringRules,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            max_moves: DEFAULT_MAX_MOVES,
            seed: 1,
            weights: None,
            rules: ScoringRules::default(),
        }
    }
}

impl GameConfig {
    /// Default configuration with a specific seed
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parses and validates configuration from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Defaults, then `SPECIES_MATCH_CONFIG`, then individual variables.
    ///
    /// Unparseable variables are ignored; a config file that fails to load
    /// or a final result that fails validation is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        use std::env;

        let mut config = match env::var("SPECIES_MATCH_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_json_file(path.trim())?,
            _ => Self::default(),
        };

        if let Some(width) = env_parse("SPECIES_MATCH_WIDTH") {
            config.width = width;
        }
        if let Some(height) = env_parse("SPECIES_MATCH_HEIGHT") {
            config.height = height;
        }
        if let Some(max_moves) = env_parse("SPECIES_MATCH_MAX_MOVES") {
            config.max_moves = max_moves;
        }
        if let Some(seed) = env_parse("SPECIES_MATCH_SEED") {
            config.seed = seed;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, side) in [("width", self.width), ("height", self.height)] {
            if !(MIN_GRID_SIDE..=MAX_GRID_SIDE).contains(&side) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between {} and {}, got {}",
                    name, MIN_GRID_SIDE, MAX_GRID_SIDE, side
                )));
            }
        }

        if self.max_moves == 0 {
            return Err(ConfigError::Invalid("max_moves must be positive".into()));
        }

        let rules = &self.rules;
        if !(rules.streak_step.is_finite() && rules.streak_step >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "streak_step must be a non-negative number, got {}",
                rules.streak_step
            )));
        }

        // Bonuses never lower a score.
        let multipliers = [
            ("streak_cap", rules.streak_cap),
            ("large_match_bonus", rules.large_match_bonus),
            ("huge_match_bonus", rules.huge_match_bonus),
            ("multi_category_bonus", rules.multi_category_bonus),
            ("repeat_category_bonus", rules.repeat_category_bonus),
        ];
        for (name, value) in multipliers {
            if !(value.is_finite() && value >= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a number >= 1, got {}",
                    name, value
                )));
            }
        }

        if rules.huge_match_bonus < rules.large_match_bonus {
            return Err(ConfigError::Invalid(format!(
                "huge_match_bonus ({}) must not be below large_match_bonus ({})",
                rules.huge_match_bonus, rules.large_match_bonus
            )));
        }

        if rules.large_match_len > rules.huge_match_len {
            return Err(ConfigError::Invalid(format!(
                "large_match_len ({}) must not exceed huge_match_len ({})",
                rules.large_match_len, rules.huge_match_len
            )));
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileCategory;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.width, 7);
        assert_eq!(config.height, 8);
    }

    #[test]
    fn json_overrides_nested_rules_and_weights() {
        let config = GameConfig::from_json_str(
            r#"{
                "seed": 42,
                "weights": { "red": 3.0, "green": 1.0, "blue": 1.0 },
                "rules": { "points_per_tile": 25 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.rules.points_per_tile, 25);
        assert_eq!(config.rules.streak_cap, ScoringRules::default().streak_cap);
        let weights = config.weights.unwrap();
        assert_eq!(weights.get(TileCategory::Red), 3.0);
        assert_eq!(weights.get(TileCategory::Pink), 0.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "width": 2 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "max_moves": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "rules": { "streak_cap": -1.0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "rules": { "large_match_bonus": 0.5 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str(
                r#"{ "rules": { "large_match_bonus": 2.5, "huge_match_bonus": 2.0 } }"#
            ),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "rules": { "repeat_category_bonus": 0.9 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "weights": { "red": 0.0 } }"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "height": 9, "seed": 7 }}"#).unwrap();
        let config = GameConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.height, 9);
        assert_eq!(config.seed, 7);

        assert!(matches!(
            GameConfig::from_json_file("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
