//! # Frame Pipeline
//!
//! Double-buffered frame submission between a simulation thread and a
//! render thread.
//!
//! ## Features
//!
//! - **Two-slot handoff**: the simulation writes frame N+1 while frame N is drawn
//! - **Strict alternation**: two auto-reset events, no locks held across frames
//! - **Transparency ordering**: opaque in submission order, transparent back-to-front
//! - **Balanced asset lifetimes**: entries hold `Arc`s that are dropped after drawing
//! - **Pluggable backend**: any [`RenderBackend`](render::RenderBackend) implementation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use frame_pipeline::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (backend, _log) = RecordingBackend::new();
//!     let (mut renderer, mut submitter) = RenderSystem::initialize(RenderSystemConfig::default(), backend)?;
//!     let render_thread = std::thread::spawn(move || {
//!         let frames = renderer.run_render_loop();
//!         (renderer, frames)
//!     });
//!
//!     let mesh = Arc::new(Mesh::quad("quad", 0.5, Color::WHITE)?);
//!     let effect = Arc::new(Effect::new("unlit", "vs_unlit", "fs_unlit", RenderState::OPAQUE)?);
//!     let texture = Arc::new(Texture::new("white", 1, 1)?);
//!
//!     if submitter.wait_until_ready_for_submission(Duration::from_millis(100))? == WaitOutcome::Signaled {
//!         submitter.submit_camera(&Camera::default(), Vec3::new(0.0, 0.0, -5.0), Quat::identity());
//!         submitter.submit_mesh(&mesh, &effect, &texture, Vec3::zeros(), Quat::identity());
//!         submitter.signal_submission_complete()?;
//!     }
//!
//!     submitter.request_shutdown();
//!     let (renderer, frames) = render_thread.join().expect("render thread panicked");
//!     frames?;
//!     renderer.clean_up()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core modules
pub mod core;
pub mod config;
pub mod foundation;
pub mod assets;
pub mod render;

/// Common imports for pipeline users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, AssetHandle, AssetManager},
        core::{Config, PipelineConfig, RenderSystemConfig},
        foundation::{
            math::{Pose, Quat, Vec2, Vec3},
            time::{Stopwatch, Timer},
        },
        render::{
            Camera, Color, CommandLog, Effect, FrameOutcome, FrameReport, FrameSubmitter, Mesh, PipelineError,
            RecordingBackend, RenderBackend, RenderState, RenderSystem, ShutdownHandle, Sprite, SyncError,
            Texture, WaitOutcome,
        },
    };
}
