//! Gameplay constants that do not depend on the player's finances.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use savings_arcade_core::{PlayField, RUN_DURATION};
use savings_arcade_system_weapons::Config as WeaponsConfig;
use savings_arcade_world::WorldConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure raised while loading a tuning file.
#[derive(Debug, Error)]
pub enum TuningError {
    /// The tuning file could not be read.
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The tuning file is not valid TOML for [`Tuning`].
    #[error("malformed tuning document: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is outside its accepted range.
    #[error("tuning field `{field}` {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Constraint that was violated.
        reason: &'static str,
    },
}

/// Tunable gameplay constants. `Tuning::default()` is the canonical game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Width of the play field.
    pub field_width: f32,
    /// Height of the play field.
    pub field_height: f32,
    /// Hull points at run start.
    pub starting_hull: u32,
    /// Collision radius of the ship.
    pub ship_radius: f32,
    /// Horizontal ship speed in units per second.
    pub ship_speed: f32,
    /// Distance between the ship's centre and the bottom edge.
    pub ship_offset: f32,
    /// Upward projectile speed in units per second.
    pub projectile_speed: f32,
    /// Collision radius of projectiles.
    pub projectile_radius: f32,
    /// Collision radius of power-ups.
    pub power_up_radius: f32,
    /// Downward power-up speed in units per second.
    pub power_up_speed: f32,
    /// Lateral speed fragments gain when an asteroid splits.
    pub fragment_lateral_speed: f32,
    /// Cooldown between shots.
    pub fire_cooldown_ms: u64,
    /// Cooldown between shots while rapid fire is active.
    pub rapid_fire_cooldown_ms: u64,
    /// Highlight applied to an asteroid that survives a hit.
    pub asteroid_flash_ms: u64,
    /// Highlight applied to the ship after an impact.
    pub ship_flash_ms: u64,
    /// Minimum spacing between outward state snapshots.
    pub snapshot_interval_ms: u64,
    /// Fraction of the run after which pressure asteroids appear.
    pub pressure_start_fraction: f32,
    /// Extra fall speed reached at the end of the run, as a fraction.
    pub late_speed_ramp: f32,
    /// Seed of the pressure asteroid lane generator.
    pub pressure_seed: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            field_width: world.field.width,
            field_height: world.field.height,
            starting_hull: 3,
            ship_radius: world.ship_radius,
            ship_speed: world.ship_speed,
            ship_offset: world.ship_offset,
            projectile_speed: world.projectile_speed,
            projectile_radius: world.projectile_radius,
            power_up_radius: world.power_up_radius,
            power_up_speed: world.power_up_speed,
            fragment_lateral_speed: world.fragment_lateral_speed,
            fire_cooldown_ms: 260,
            rapid_fire_cooldown_ms: 110,
            asteroid_flash_ms: 120,
            ship_flash_ms: 400,
            snapshot_interval_ms: 140,
            pressure_start_fraction: 0.5,
            late_speed_ramp: 0.35,
            pressure_seed: 0x5a17_e2f1_9c3b_d804,
        }
    }
}

impl Tuning {
    /// Parses and validates a TOML tuning document. Missing fields keep their defaults.
    pub fn from_toml_str(document: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = toml::from_str(document)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reads, parses and validates a TOML tuning file.
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let document = fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&document)
    }

    /// Checks every value against its accepted range.
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("ship_radius", self.ship_radius),
            ("projectile_radius", self.projectile_radius),
            ("power_up_radius", self.power_up_radius),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be a positive number",
                });
            }
        }

        let non_negative = [
            ("ship_speed", self.ship_speed),
            ("ship_offset", self.ship_offset),
            ("projectile_speed", self.projectile_speed),
            ("power_up_speed", self.power_up_speed),
            ("fragment_lateral_speed", self.fragment_lateral_speed),
            ("late_speed_ramp", self.late_speed_ramp),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be a non-negative number",
                });
            }
        }

        if self.starting_hull == 0 {
            return Err(TuningError::Invalid {
                field: "starting_hull",
                reason: "must be at least 1",
            });
        }
        if self.fire_cooldown_ms == 0 || self.rapid_fire_cooldown_ms == 0 {
            return Err(TuningError::Invalid {
                field: "fire_cooldown_ms",
                reason: "cooldowns must be positive",
            });
        }
        if !(0.0..=1.0).contains(&self.pressure_start_fraction) {
            return Err(TuningError::Invalid {
                field: "pressure_start_fraction",
                reason: "must lie within [0, 1]",
            });
        }
        if self.ship_offset > self.field_height {
            return Err(TuningError::Invalid {
                field: "ship_offset",
                reason: "must fit inside the field",
            });
        }
        Ok(())
    }

    /// Play field described by the tuning.
    #[must_use]
    pub fn field(&self) -> PlayField {
        PlayField {
            width: self.field_width,
            height: self.field_height,
        }
    }

    /// World geometry and motion constants.
    #[must_use]
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            field: self.field(),
            ship_radius: self.ship_radius,
            ship_speed: self.ship_speed,
            ship_offset: self.ship_offset,
            projectile_speed: self.projectile_speed,
            projectile_radius: self.projectile_radius,
            power_up_radius: self.power_up_radius,
            power_up_speed: self.power_up_speed,
            fragment_lateral_speed: self.fragment_lateral_speed,
            asteroid_flash: Duration::from_millis(self.asteroid_flash_ms),
            ship_flash: Duration::from_millis(self.ship_flash_ms),
        }
    }

    /// Firing cadence for the weapons system.
    #[must_use]
    pub fn weapons_config(&self) -> WeaponsConfig {
        WeaponsConfig::new(
            Duration::from_millis(self.fire_cooldown_ms),
            Duration::from_millis(self.rapid_fire_cooldown_ms),
        )
    }

    /// Elapsed time at which the pressure ramp begins.
    #[must_use]
    pub fn pressure_start(&self) -> Duration {
        RUN_DURATION.mul_f32(self.pressure_start_fraction.clamp(0.0, 1.0))
    }

    /// Motion multiplier applied to falling entities at `elapsed`.
    #[must_use]
    pub fn speed_scale(&self, elapsed: Duration) -> f32 {
        let progress = (elapsed.as_secs_f32() / RUN_DURATION.as_secs_f32()).clamp(0.0, 1.0);
        1.0 + self.late_speed_ramp * progress
    }

    /// Minimum spacing between outward state snapshots.
    #[must_use]
    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_interval_ms)
    }
}
