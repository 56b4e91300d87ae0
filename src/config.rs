//! # World Configuration
//!
//! Runtime settings for a [`crate::engine_state::EngineState`], loaded from a
//! JSON document. Every field has a default, so an empty object `{}` is a
//! valid configuration.
//!
//! ```
//! use voxel_world::config::{GenerationMode, WorldConfig};
//!
//! let config = WorldConfig::from_json_str(r#"{ "seed": 7, "generation": "flat" }"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.generation, GenerationMode::Flat);
//! assert_eq!(config.streaming_radius, 8);
//! ```

use std::{fs, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable the binary reads a config path from.
pub const CONFIG_PATH_ENV: &str = "VOXEL_WORLD_CONFIG";

/// Which terrain source fills newly created chunks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Biome-driven procedural terrain.
    #[default]
    Noise,
    /// Bedrock at y=0, stone up to y=62, grass at y=63, air above.
    Flat,
}

/// Settings for a single world instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for every noise source. Equal seeds produce equal terrain.
    pub seed: u32,
    /// Chebyshev radius, in chunks, kept resident around the player.
    pub streaming_radius: i32,
    /// Number of worker threads building chunks.
    pub worker_count: usize,
    /// Terrain source for chunks built locally.
    pub generation: GenerationMode,
    /// When set, chunks are requested from a server instead of generated.
    pub network: bool,
    /// Fixed simulation rate in steps per second.
    pub tick_rate_hz: f64,
    /// Upper bound on the frame time fed into the fixed-step accumulator, in seconds.
    pub max_frame_time: f64,
    /// Downward acceleration applied to entities affected by gravity.
    pub gravity: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            streaming_radius: 8,
            worker_count: 4,
            generation: GenerationMode::Noise,
            network: false,
            tick_rate_hz: 20.0,
            max_frame_time: 0.25,
            gravity: 9.81,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Arguments
    /// * `path` - Path of a JSON document
    ///
    /// # Returns
    /// The validated configuration, or the I/O, parse or validation error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading world config from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Rejects settings the world cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.streaming_radius < 0 {
            return Err(ConfigError::Invalid(format!(
                "streaming_radius must be non-negative, got {}",
                self.streaming_radius
            )));
        }
        if self.worker_count == 0 {
            return Err(ConfigError::Invalid("worker_count must be at least 1".into()));
        }
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tick_rate_hz must be positive, got {}",
                self.tick_rate_hz
            )));
        }
        if !(self.max_frame_time.is_finite() && self.max_frame_time > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_frame_time must be positive, got {}",
                self.max_frame_time
            )));
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite".into()));
        }
        Ok(())
    }

    /// Length of one simulation step in seconds.
    pub fn fixed_time_step(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = WorldConfig::from_json_str("{}").unwrap();
        assert_eq!(config, WorldConfig::default());
        assert!((config.fixed_time_step() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn rejects_zero_workers() {
        let err = WorldConfig::from_json_str(r#"{ "worker_count": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_negative_radius() {
        let err = WorldConfig::from_json_str(r#"{ "streaming_radius": -1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = WorldConfig::from_json_str("{ seed: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = WorldConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
