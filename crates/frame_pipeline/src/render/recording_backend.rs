//! # Recording Backend
//!
//! A headless [`RenderBackend`] that records every call instead of talking to
//! a GPU. The demo binary renders through it and the tests assert on the
//! recorded command stream.
//!
//! The command log is shared through a cloneable [`CommandLog`] handle so it
//! can still be inspected after the backend has been moved into the render
//! system and onto the render thread.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::render::{
    backend::{BackendOperation, BackendResult, RenderBackend},
    color::Color,
    constants::{PerDrawCallConstants, PerFrameConstants},
    resources::{Effect, Mesh, Sprite, Texture},
    RenderError,
};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Backend initialized
    Initialize,
    /// Color target cleared
    ClearColor(Color),
    /// Depth target cleared
    ClearDepth(f32),
    /// Per-frame constants uploaded
    UploadPerFrameConstants(PerFrameConstants),
    /// Per-draw-call constants uploaded
    UploadPerDrawCallConstants(PerDrawCallConstants),
    /// Effect bound, by name
    BindEffect(String),
    /// Texture bound to a slot, by name
    BindTexture {
        /// Texture name
        texture: String,
        /// Sampler slot
        slot: u32,
    },
    /// Mesh drawn, by name
    DrawMesh(String),
    /// Sprite drawn, by name
    DrawSprite(String),
    /// Back buffer presented
    Present,
    /// Backend cleaned up
    CleanUp,
}

impl DrawCommand {
    /// Name of the drawn mesh or sprite, if this is a draw
    pub fn drawn_name(&self) -> Option<&str> {
        match self {
            Self::DrawMesh(name) | Self::DrawSprite(name) => Some(name),
            _ => None,
        }
    }
}

/// Shared, cloneable view of a recording backend's command stream
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    commands: Arc<Mutex<Vec<DrawCommand>>>,
}

impl CommandLog {
    fn lock(&self) -> MutexGuard<'_, Vec<DrawCommand>> {
        // A panic while pushing cannot leave the Vec half-written
        self.commands.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn push(&self, command: DrawCommand) {
        self.lock().push(command);
    }

    /// Copy of every command recorded so far
    pub fn snapshot(&self) -> Vec<DrawCommand> {
        self.lock().clone()
    }

    /// Remove and return every command recorded so far
    pub fn take(&self) -> Vec<DrawCommand> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of commands recorded so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Names of drawn meshes and sprites, in draw order
    pub fn drawn_names(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(DrawCommand::drawn_name)
            .map(str::to_owned)
            .collect()
    }
}

/// Headless backend recording every call into a [`CommandLog`]
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: CommandLog,
    failing: HashSet<BackendOperation>,
    initialized: bool,
}

impl RecordingBackend {
    /// Create a backend and the log handle observing it
    pub fn new() -> (Self, CommandLog) {
        let backend = Self::default();
        let log = backend.log.clone();
        (backend, log)
    }

    /// Make every call of `operation` fail with a backend error
    pub fn fail_on(mut self, operation: BackendOperation) -> Self {
        self.failing.insert(operation);
        self
    }

    /// Handle to the command log
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    fn record(&mut self, operation: BackendOperation, command: DrawCommand) -> BackendResult<()> {
        if self.failing.contains(&operation) {
            return Err(RenderError::BackendError(format!("{operation:?} failed (injected)")));
        }
        if !self.initialized && !matches!(operation, BackendOperation::Initialize | BackendOperation::CleanUp) {
            return Err(RenderError::RenderingFailed(format!("{operation:?} before initialize")));
        }
        self.log.push(command);
        Ok(())
    }
}

impl RenderBackend for RecordingBackend {
    fn initialize(&mut self) -> BackendResult<()> {
        self.record(BackendOperation::Initialize, DrawCommand::Initialize)?;
        self.initialized = true;
        log::debug!("Recording backend initialized");
        Ok(())
    }

    fn clear_color(&mut self, color: Color) -> BackendResult<()> {
        self.record(BackendOperation::ClearColor, DrawCommand::ClearColor(color))
    }

    fn clear_depth(&mut self, depth: f32) -> BackendResult<()> {
        self.record(BackendOperation::ClearDepth, DrawCommand::ClearDepth(depth))
    }

    fn update_per_frame_constants(&mut self, constants: &PerFrameConstants) -> BackendResult<()> {
        // Round-trip through the upload bytes so the recorded value is what a GPU would see
        let uploaded: PerFrameConstants = bytemuck::pod_read_unaligned(constants.as_bytes());
        self.record(
            BackendOperation::UpdatePerFrameConstants,
            DrawCommand::UploadPerFrameConstants(uploaded),
        )
    }

    fn update_per_draw_call_constants(&mut self, constants: &PerDrawCallConstants) -> BackendResult<()> {
        let uploaded: PerDrawCallConstants = bytemuck::pod_read_unaligned(constants.as_bytes());
        self.record(
            BackendOperation::UpdatePerDrawCallConstants,
            DrawCommand::UploadPerDrawCallConstants(uploaded),
        )
    }

    fn bind_effect(&mut self, effect: &Effect) -> BackendResult<()> {
        self.record(BackendOperation::BindEffect, DrawCommand::BindEffect(effect.name().to_owned()))
    }

    fn bind_texture(&mut self, texture: &Texture, slot: u32) -> BackendResult<()> {
        self.record(
            BackendOperation::BindTexture,
            DrawCommand::BindTexture {
                texture: texture.name().to_owned(),
                slot,
            },
        )
    }

    fn draw_mesh(&mut self, mesh: &Mesh) -> BackendResult<()> {
        self.record(BackendOperation::DrawMesh, DrawCommand::DrawMesh(mesh.name().to_owned()))
    }

    fn draw_sprite(&mut self, sprite: &Sprite) -> BackendResult<()> {
        self.record(BackendOperation::DrawSprite, DrawCommand::DrawSprite(sprite.name().to_owned()))
    }

    fn present(&mut self) -> BackendResult<()> {
        self.record(BackendOperation::Present, DrawCommand::Present)
    }

    fn clean_up(&mut self) -> BackendResult<()> {
        self.record(BackendOperation::CleanUp, DrawCommand::CleanUp)?;
        self.initialized = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_call_order() {
        let (mut backend, log) = RecordingBackend::new();
        backend.initialize().unwrap();
        backend.clear_color(Color::RED).unwrap();
        backend.present().unwrap();

        assert_eq!(
            log.snapshot(),
            vec![DrawCommand::Initialize, DrawCommand::ClearColor(Color::RED), DrawCommand::Present]
        );
    }

    #[test]
    fn test_injected_failure_is_not_recorded() {
        let (backend, log) = RecordingBackend::new();
        let mut backend = backend.fail_on(BackendOperation::Present);
        backend.initialize().unwrap();

        assert!(matches!(backend.present(), Err(RenderError::BackendError(_))));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_calls_before_initialize_fail() {
        let (mut backend, log) = RecordingBackend::new();
        assert!(backend.clear_depth(1.0).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_take_drains_log() {
        let (mut backend, log) = RecordingBackend::new();
        backend.initialize().unwrap();
        assert_eq!(log.take().len(), 1);
        assert!(log.is_empty());
    }
}
