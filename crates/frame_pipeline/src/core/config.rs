//! # Unified Configuration System
//!
//! Typed configuration for the frame submission pipeline. Every struct here is
//! serde-serializable so it can be loaded through [`Config`] from TOML or RON.
//!
//! ## Configuration Categories
//!
//! - **Render System Config**: handshake timeouts, clear defaults, entry capacities
//! - **Logging Config**: default log level for binaries embedding the pipeline
//! - **Pipeline Config**: top-level container applications load from disk

use serde::{Serialize, Deserialize};
use std::time::Duration;

use crate::render::color::Color;

pub use crate::config::{Config, ConfigError};

/// # Render System Configuration
///
/// Controls the submission/render handshake and the state a frame slot
/// starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSystemConfig {
    /// Default timeout used by `FrameSubmitter::wait_until_ready`
    pub submission_timeout_ms: u64,
    /// Timeout for the render thread's wait on a submitted frame.
    ///
    /// `None` blocks until a frame arrives or the pipeline shuts down.
    pub render_wait_timeout_ms: Option<u64>,
    /// Background color both slots start with
    pub default_background_color: Color,
    /// Depth clear value both slots start with
    pub default_depth_clear: f32,
    /// Mesh entries reserved per slot at initialization
    pub initial_mesh_capacity: usize,
    /// Sprite entries reserved per slot at initialization
    pub initial_sprite_capacity: usize,
    /// Texture slot textures are bound to before each draw
    pub texture_slot: u32,
}

impl RenderSystemConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            submission_timeout_ms: 1000,
            render_wait_timeout_ms: None,
            default_background_color: Color::BLACK,
            default_depth_clear: 1.0,
            initial_mesh_capacity: 64,
            initial_sprite_capacity: 16,
            texture_slot: 0,
        }
    }

    /// Set the default submission timeout
    pub fn with_submission_timeout(mut self, timeout: Duration) -> Self {
        self.submission_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Bound the render thread's wait for a submitted frame
    pub fn with_render_wait_timeout(mut self, timeout: Duration) -> Self {
        self.render_wait_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Set the background color slots start with
    pub fn with_background_color(mut self, color: Color) -> Self {
        self.default_background_color = color;
        self
    }

    /// Reserve entry capacity per slot
    pub fn with_capacity(mut self, meshes: usize, sprites: usize) -> Self {
        self.initial_mesh_capacity = meshes;
        self.initial_sprite_capacity = sprites;
        self
    }

    /// Default submission timeout as a duration
    pub fn submission_timeout(&self) -> Duration {
        Duration::from_millis(self.submission_timeout_ms)
    }

    /// Render wait timeout as a duration, `None` for an unbounded wait
    pub fn render_wait_timeout(&self) -> Option<Duration> {
        self.render_wait_timeout_ms.map(Duration::from_millis)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.submission_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "submission_timeout_ms",
                reason: "must be at least 1ms".to_string(),
            });
        }

        if self.render_wait_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "render_wait_timeout_ms",
                reason: "use None for an unbounded wait instead of 0".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.default_depth_clear) {
            return Err(ConfigError::Invalid {
                field: "default_depth_clear",
                reason: format!("{} is outside [0, 1]", self.default_depth_clear),
            });
        }

        Ok(())
    }
}

impl Default for RenderSystemConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Logging Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset
    pub log_level: String,
}

impl LoggingConfig {
    /// Parse the configured level, falling back to `Info`
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// # Complete Pipeline Configuration
///
/// Top-level configuration applications load from disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Render system configuration
    pub render: RenderSystemConfig,
}

impl PipelineConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.render.validate()
    }
}

impl Config for PipelineConfig {}
