//! # Core Module
//!
//! Shared configuration types used by the render system and by binaries that
//! embed it.

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    PipelineConfig,
    RenderSystemConfig,
    LoggingConfig,
    Config,
    ConfigError,
};
