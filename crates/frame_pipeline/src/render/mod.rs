//! # Rendering System
//!
//! Double-buffered frame submission between a simulation thread and a render
//! thread.
//!
//! ## Architecture
//!
//! - **FrameSubmitter**: simulation-side API writing into the submit slot
//! - **FrameSlots**: the two frame slots and the index swap between them
//! - **SubmissionGate**: paired auto-reset events enforcing strict alternation
//! - **RenderSystem**: render-side procedure that swaps, orders, draws and releases
//! - **RenderBackend**: the platform graphics API, behind a trait
//!
//! ## Frame Handoff
//!
//! Only the slot index moves between threads. While the renderer draws frame
//! N from one slot, the simulation writes frame N+1 into the other.

// Collaborator types
pub mod color;
pub mod camera;
pub mod resources;
pub mod constants;

// Backend contract
pub mod backend;
pub mod recording_backend;

// Frame pipeline
pub mod frame_data;
pub mod double_buffer;
pub mod sync;
pub mod render_queue;
pub mod submission;
pub mod render_system;

#[cfg(test)]
mod tests;

use thiserror::Error;

pub use backend::{BackendOperation, BackendResult, RenderBackend};
pub use camera::Camera;
pub use color::Color;
pub use constants::{PerDrawCallConstants, PerFrameConstants};
pub use frame_data::{FrameData, MeshEntry, SpriteEntry};
pub use recording_backend::{CommandLog, DrawCommand, RecordingBackend};
pub use render_queue::{partition_and_sort, CommandType, RenderCommand, RenderQueue};
pub use render_system::{FrameOutcome, FrameReport, FrameStats, PipelineError, RenderSystem, ShutdownHandle};
pub use resources::{Effect, Mesh, RenderState, Sprite, Texture};
pub use submission::FrameSubmitter;
pub use sync::{SyncError, WaitOutcome};

/// Rendering system errors
///
/// Reported by [`RenderBackend`] implementations. Inside a frame they are
/// logged and absorbed; only `initialize` and `clean_up` failures reach the
/// caller, wrapped in [`PipelineError::Backend`].
#[derive(Error, Debug)]
pub enum RenderError {
    /// Backend initialization failed during setup
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// A clear, upload, bind, draw or present call failed
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// A GPU resource could not be created
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific error
    #[error("Backend error: {0}")]
    BackendError(String),
}
