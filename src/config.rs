//! Runtime configuration
//!
//! Everything tunable lives in one JSON document. Missing fields take their
//! defaults, so a config file only needs the values it changes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::dither::ShadeConfig;
use crate::particles::PARTICLE_COUNT;

pub const DEFAULT_CONFIG_PATH: &str = "voidsphere.json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub radius: f32,
    /// Recursive icosahedron subdivision level
    pub subdivisions: u32,
    /// Uniform model scale
    pub scale: f32,
    /// Yaw increment per 60 Hz frame (radians)
    pub yaw_per_frame: f32,
    /// Roll target per unit of horizontal pointer offset
    pub tilt_factor: f32,
    /// Fraction of the remaining roll covered per 60 Hz frame
    pub tilt_lerp: f32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            radius: 1.5,
            subdivisions: 5,
            scale: 1.2,
            yaw_per_frame: 0.002,
            tilt_factor: 0.1,
            tilt_lerp: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: PARTICLE_COUNT,
            seed: 0x5EED_D17E,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 5.0,
            fov_degrees: 45.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub sphere: SphereConfig,
    pub particles: ParticleConfig,
    pub camera: CameraConfig,
    pub shade: ShadeConfig,
}

impl Config {
    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid config: {}", e))
    }

    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("Config: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        let config = Self::from_json(&json).map_err(|e| format!("{}: {}", path.display(), e))?;
        log::info!("Config: loaded {}", path.display());
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_scene() {
        let config = Config::default();
        assert_eq!(config.sphere.radius, 1.5);
        assert_eq!(config.sphere.scale, 1.2);
        assert_eq!(config.particles.count, 100);
        assert_eq!(config.camera.distance, 5.0);
        assert_eq!(config.camera.fov_degrees, 45.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "sphere": { "subdivisions": 3 }, "particles": { "seed": 7 } }"#)
            .unwrap();
        assert_eq!(config.sphere.subdivisions, 3);
        assert_eq!(config.sphere.radius, 1.5);
        assert_eq!(config.particles.seed, 7);
        assert_eq!(config.particles.count, PARTICLE_COUNT);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_malformed_json_is_error() {
        let err = Config::from_json("{ \"sphere\": ").unwrap_err();
        assert!(err.starts_with("invalid config"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load("/nonexistent/voidsphere-test.json").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("voidsphere-{}.json", std::process::id()));
        let mut config = Config::default();
        config.window.width = 800;
        config.shade.light_dir = [0.0, 1.0, 0.0];
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
