//! Backend abstraction traits for the rendering system
//!
//! This module defines the trait a platform graphics backend implements so
//! the render procedure can clear, upload constants, bind and draw without
//! knowing which graphics API sits underneath.

use crate::render::{
    color::Color,
    constants::{PerDrawCallConstants, PerFrameConstants},
    resources::{Effect, Mesh, Sprite, Texture},
    RenderError,
};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Identifies a backend operation, for logging and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    /// `initialize`
    Initialize,
    /// `clear_color`
    ClearColor,
    /// `clear_depth`
    ClearDepth,
    /// `update_per_frame_constants`
    UpdatePerFrameConstants,
    /// `update_per_draw_call_constants`
    UpdatePerDrawCallConstants,
    /// `bind_effect`
    BindEffect,
    /// `bind_texture`
    BindTexture,
    /// `draw_mesh`
    DrawMesh,
    /// `draw_sprite`
    DrawSprite,
    /// `present`
    Present,
    /// `clean_up`
    CleanUp,
}

/// Platform graphics backend
///
/// Only the render thread talks to the backend, so methods take `&mut self`.
/// The per-frame and per-draw-call constant buffers are created and bound
/// once in [`initialize`](Self::initialize); the update methods only copy
/// new contents into them.
pub trait RenderBackend: Send {
    /// Create constant buffers, samplers and views, and bind the ones that never change
    fn initialize(&mut self) -> BackendResult<()>;

    /// Fill the color target with a solid color
    fn clear_color(&mut self, color: Color) -> BackendResult<()>;

    /// Fill the depth target with a depth value
    fn clear_depth(&mut self, depth: f32) -> BackendResult<()>;

    /// Copy per-frame constants into the per-frame constant buffer
    fn update_per_frame_constants(&mut self, constants: &PerFrameConstants) -> BackendResult<()>;

    /// Copy per-draw-call constants into the per-draw-call constant buffer
    fn update_per_draw_call_constants(&mut self, constants: &PerDrawCallConstants) -> BackendResult<()>;

    /// Bind an effect's shaders and render state
    fn bind_effect(&mut self, effect: &Effect) -> BackendResult<()>;

    /// Bind a texture to a sampler slot
    fn bind_texture(&mut self, texture: &Texture, slot: u32) -> BackendResult<()>;

    /// Draw a mesh with the currently bound state
    fn draw_mesh(&mut self, mesh: &Mesh) -> BackendResult<()>;

    /// Draw a sprite with the currently bound state
    fn draw_sprite(&mut self, sprite: &Sprite) -> BackendResult<()>;

    /// Swap the back buffer to the front
    fn present(&mut self) -> BackendResult<()>;

    /// Release everything created in `initialize`
    fn clean_up(&mut self) -> BackendResult<()>;
}
