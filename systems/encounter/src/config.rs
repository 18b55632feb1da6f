//! Encounter configuration loaded from TOML.

use std::time::Duration;

use monster_dungeon_core::{CellCoord, GRID_COLUMNS, GRID_ROWS, PLAYER_START};
use monster_dungeon_system_projectiles as projectiles;
use monster_dungeon_system_spawning::{self as spawning, Roster};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grace window after firing during which descent is deferred.
pub const DEFAULT_DESCENT_DELAY_MS: u64 = 300;

/// Errors raised while loading an encounter configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document was not valid TOML or did not match the schema.
    #[error("failed to parse encounter configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Projectiles must travel upward.
    #[error("projectile speed must be positive, got {speed}")]
    NonPositiveSpeed {
        /// Rejected speed in rows per second.
        speed: f32,
    },
    /// The player must start on the grid.
    #[error("player start ({column}, {row}) lies outside the grid")]
    StartOutsideGrid {
        /// Rejected column.
        column: u32,
        /// Rejected row.
        row: u32,
    },
}

/// Tunables for one combat encounter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncounterConfig {
    /// Seed of the encounter's random generator.
    pub seed: u64,
    /// Descent delay armed by firing, in milliseconds. Zero disables it.
    pub descent_delay_ms: u64,
    /// Projectile speed in rows per second.
    pub projectile_speed: f32,
    /// Damage carried by projectiles.
    pub projectile_damage: u32,
    /// Selects the difficulty-scaled spawn roster when present.
    pub difficulty: Option<u32>,
    /// Column the player starts in.
    pub player_column: u32,
    /// Row the player starts in.
    pub player_row: u32,
}

impl EncounterConfig {
    /// Parses and validates a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values that would otherwise be silently corrected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.projectile_speed > 0.0) {
            return Err(ConfigError::NonPositiveSpeed {
                speed: self.projectile_speed,
            });
        }
        if self.player_column >= GRID_COLUMNS || self.player_row >= GRID_ROWS {
            return Err(ConfigError::StartOutsideGrid {
                column: self.player_column,
                row: self.player_row,
            });
        }
        Ok(())
    }

    /// Descent delay as a duration.
    #[must_use]
    pub const fn descent_delay(&self) -> Duration {
        Duration::from_millis(self.descent_delay_ms)
    }

    /// Cell the player starts in.
    #[must_use]
    pub const fn player_start(&self) -> CellCoord {
        CellCoord::new(self.player_column, self.player_row)
    }

    /// Spawn policy settings derived from the configured roster.
    #[must_use]
    pub fn spawning(&self) -> spawning::Config {
        let roster = self
            .difficulty
            .map_or(Roster::Standard, |difficulty| Roster::Scaled { difficulty });
        spawning::Config::new(GRID_COLUMNS, roster)
    }

    /// Projectile simulator settings.
    #[must_use]
    pub fn projectiles(&self) -> projectiles::Config {
        projectiles::Config::new(self.projectile_speed, self.projectile_damage)
    }
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            descent_delay_ms: DEFAULT_DESCENT_DELAY_MS,
            projectile_speed: projectiles::DEFAULT_SPEED,
            projectile_damage: projectiles::DEFAULT_DAMAGE,
            difficulty: None,
            player_column: PLAYER_START.column(),
            player_row: PLAYER_START.row(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EncounterConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, EncounterConfig::default());
        assert_eq!(config.descent_delay(), Duration::from_millis(300));
        assert_eq!(config.player_start(), PLAYER_START);
    }

    #[test]
    fn partial_document_overrides_selected_keys() {
        let config = EncounterConfig::from_toml_str(
            "seed = 99\ndescent_delay_ms = 0\ndifficulty = 4\nplayer_column = 1\n",
        )
        .expect("config parses");

        assert_eq!(config.seed, 99);
        assert_eq!(config.descent_delay(), Duration::ZERO);
        assert_eq!(config.player_start(), CellCoord::new(1, 8));
        assert_eq!(
            config.spawning().roster(),
            Roster::Scaled { difficulty: 4 }
        );
    }

    #[test]
    fn rejects_non_positive_speed() {
        let error = EncounterConfig::from_toml_str("projectile_speed = 0.0")
            .expect_err("zero speed is invalid");
        assert!(matches!(error, ConfigError::NonPositiveSpeed { .. }));
    }

    #[test]
    fn rejects_start_outside_grid() {
        let error = EncounterConfig::from_toml_str("player_row = 10")
            .expect_err("row 10 is outside the grid");
        assert!(matches!(
            error,
            ConfigError::StartOutsideGrid { column: 4, row: 10 }
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        let error = EncounterConfig::from_toml_str("lanes = 12")
            .expect_err("unknown keys are refused");
        assert!(matches!(error, ConfigError::Parse(_)));
    }
}
