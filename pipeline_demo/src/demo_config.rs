//! Demo configuration, loadable from TOML or RON

use frame_pipeline::config::{Config, ConfigError};
use frame_pipeline::core::PipelineConfig;
use serde::{Deserialize, Serialize};

/// Camera placement for the demo scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoCameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Width over height of the (virtual) window
    pub aspect: f32,
    /// Distance from the camera to the scene origin along -Z
    pub distance: f32,
}

impl Default for DemoCameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            aspect: 800.0 / 600.0,
            distance: 25.0,
        }
    }
}

/// Everything the demo reads from its config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Frames to simulate before shutting down
    pub frames: u64,
    /// Meshes drawn with an opaque effect
    pub opaque_objects: usize,
    /// Meshes drawn with a blending effect
    pub transparent_objects: usize,
    /// Overlay sprites
    pub sprites: usize,
    /// Objects bounce inside a cube of this half size
    pub arena_half_size: f32,
    /// Pause after each submitted frame, to mimic a fixed simulation rate
    pub frame_sleep_ms: u64,
    /// Fixed random seed; a fresh seed is drawn when unset
    pub seed: Option<u64>,
    /// Camera placement
    pub camera: DemoCameraConfig,
    /// Logging and render system settings
    pub pipeline: PipelineConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 240,
            opaque_objects: 12,
            transparent_objects: 6,
            sprites: 2,
            arena_half_size: 8.0,
            frame_sleep_ms: 2,
            seed: None,
            camera: DemoCameraConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Validate the demo and pipeline settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frames == 0 {
            return Err(ConfigError::Invalid {
                field: "frames",
                reason: "must render at least one frame".to_string(),
            });
        }

        if !(self.arena_half_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "arena_half_size",
                reason: format!("{} is not a positive size", self.arena_half_size),
            });
        }

        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid {
                field: "camera.fov_degrees",
                reason: format!("{} is outside (0, 180)", self.camera.fov_degrees),
            });
        }

        if !(self.camera.aspect > 0.0 && self.camera.aspect.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "camera.aspect",
                reason: format!("{} is not a positive ratio", self.camera.aspect),
            });
        }

        // The scene spans [-half, half]; the camera sits outside it
        if !(self.camera.distance > self.arena_half_size && self.camera.distance.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "camera.distance",
                reason: format!(
                    "{} must be finite and greater than arena_half_size ({})",
                    self.camera.distance, self.arena_half_size
                ),
            });
        }

        self.pipeline.validate()
    }
}

impl Config for DemoConfig {}
