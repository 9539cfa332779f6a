//! Tunable parameters for the playground.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! [impulse]
//! min = 1.0
//! max = 3.0
//!
//! [audio]
//! collision_min_interval = 0.5
//! ```

use std::path::Path;

use rockfall_scene::RoleRules;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RockfallConfig {
    /// World and collider parameters.
    pub physics: PhysicsConfig,
    /// Pick impulse strength.
    pub impulse: ImpulseConfig,
    /// Audio cue rate limits.
    pub audio: AudioConfig,
    /// Reset timing.
    pub reset: ResetConfig,
    /// Mesh-role naming rules for the loader hand-off.
    pub loader: RoleRules,
}

/// World and collider parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector in m/s².
    pub gravity: [f32; 3],
    /// Longest step the world is ever advanced by, in seconds.
    pub max_step: f32,
    /// Density of rock colliders.
    pub density: f32,
    /// Friction coefficient of rock colliders.
    pub friction: f32,
    /// Restitution of rock colliders.
    pub restitution: f32,
    /// Contacts with a total force below this magnitude raise no force event.
    pub contact_force_threshold: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            max_step: 0.1,
            density: 0.1,
            friction: 0.4,
            restitution: 0.4,
            contact_force_threshold: 2.0,
        }
    }
}

/// Range the random pick impulse magnitude is drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpulseConfig {
    /// Smallest magnitude (N·s).
    pub min: f32,
    /// Largest magnitude (N·s).
    pub max: f32,
}

impl Default for ImpulseConfig {
    fn default() -> Self {
        Self { min: 0.5, max: 1.5 }
    }
}

/// Audio cue rate limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Minimum seconds between two collision cues.
    pub collision_min_interval: f64,
    /// Play the explosion cue at most once between two resets.
    pub explosion_once_per_reset: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            collision_min_interval: 0.25,
            explosion_once_per_reset: false,
        }
    }
}

/// Reset timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    /// Seconds after a rebuild before picking is re-enabled.
    pub grace_delay: f64,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self { grace_delay: 0.25 }
    }
}

impl RockfallConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<()> {
        let p = &self.physics;
        if !(p.max_step.is_finite() && p.max_step > 0.0) {
            return Err(invalid(format!("physics.max_step must be positive, got {}", p.max_step)));
        }
        if !(p.density > 0.0) {
            return Err(invalid(format!("physics.density must be positive, got {}", p.density)));
        }
        if p.friction < 0.0 || p.restitution < 0.0 || p.contact_force_threshold < 0.0 {
            return Err(invalid("physics friction, restitution and threshold must be >= 0"));
        }
        if p.gravity.iter().any(|g| !g.is_finite()) {
            return Err(invalid("physics.gravity must be finite"));
        }

        let i = &self.impulse;
        if !(i.min >= 0.0 && i.min <= i.max && i.max.is_finite()) {
            return Err(invalid(format!(
                "impulse range must satisfy 0 <= min <= max, got [{}, {}]",
                i.min, i.max
            )));
        }

        if !(self.audio.collision_min_interval >= 0.0) {
            return Err(invalid("audio.collision_min_interval must be >= 0"));
        }
        if !(self.reset.grace_delay >= 0.0) {
            return Err(invalid("reset.grace_delay must be >= 0"));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> PhysicsError {
    PhysicsError::InvalidConfig(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RockfallConfig::default();
        config.validate().unwrap();
        assert_eq!(config.physics.max_step, 0.1);
        assert_eq!(config.audio.collision_min_interval, 0.25);
        assert_eq!(config.reset.grace_delay, 0.25);
        assert_eq!(config.loader.body_prefix, "explodingRocks");
    }

    #[test]
    fn test_partial_toml() {
        let config = RockfallConfig::from_toml_str(
            r#"
            [impulse]
            min = 1.0
            max = 3.0

            [loader]
            body_prefix = "shard"
            "#,
        )
        .unwrap();

        assert_eq!(config.impulse.min, 1.0);
        assert_eq!(config.impulse.max, 3.0);
        assert_eq!(config.loader.body_prefix, "shard");
        assert_eq!(config.loader.ground_name, "ground");
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn test_inverted_impulse_range() {
        let err = RockfallConfig::from_toml_str("[impulse]\nmin = 2.0\nmax = 1.0\n").unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_max_step() {
        let err = RockfallConfig::from_toml_str("[physics]\nmax_step = 0.0\n").unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = RockfallConfig::from_toml_str("[physics\n").unwrap_err();
        assert!(matches!(err, PhysicsError::ConfigParse(_)));
    }
}
