//! Frame Rendering Data Structures
//!
//! A [`FrameData`] holds everything the render thread needs to draw one
//! frame. The simulation thread fills one while the render thread draws the
//! other; see [`FrameSlots`](crate::render::double_buffer::FrameSlots).
//!
//! Entries own `Arc` references to the assets they draw. Pushing an entry is
//! the reference-count increment; clearing the entry lists is the decrement,
//! so a cleared frame never leaves a count unbalanced.

use std::sync::Arc;

use crate::foundation::math::{self, Mat4, Pose, Quat, Vec3};
use crate::render::{
    camera::Camera,
    color::Color,
    constants::PerFrameConstants,
    resources::{Effect, Mesh, Sprite, Texture},
};

/// A mesh to draw with an effect and texture at a world pose
#[derive(Debug, Clone)]
pub struct MeshEntry {
    /// Geometry to draw
    pub mesh: Arc<Mesh>,
    /// Effect bound for the draw
    pub effect: Arc<Effect>,
    /// Texture bound for the draw
    pub texture: Arc<Texture>,
    /// World position
    pub position: Vec3,
    /// World orientation
    pub orientation: Quat,
}

impl MeshEntry {
    /// Local-to-world transform for this entry
    pub fn local_to_world(&self) -> Mat4 {
        Pose::new(self.position, self.orientation).local_to_world()
    }

    /// Whether the bound effect blends, which puts the entry in the transparent pass
    pub fn is_transparent(&self) -> bool {
        self.effect.render_state().is_alpha_transparency_enabled()
    }
}

/// A sprite to draw as part of the 2D overlay
#[derive(Debug, Clone)]
pub struct SpriteEntry {
    /// Quad to draw
    pub sprite: Arc<Sprite>,
    /// Effect bound for the draw
    pub effect: Arc<Effect>,
    /// Texture bound for the draw
    pub texture: Arc<Texture>,
}

/// All render state submitted for a single frame
#[derive(Debug)]
pub struct FrameData {
    mesh_entries: Vec<MeshEntry>,
    sprite_entries: Vec<SpriteEntry>,
    per_frame: PerFrameConstants,
    background_color: Color,
    depth_clear: f32,
}

impl Default for FrameData {
    fn default() -> Self {
        Self::new(Color::BLACK, 1.0, 0, 0)
    }
}

impl FrameData {
    /// Create an empty frame with the given clear defaults and entry capacity
    pub fn new(background_color: Color, depth_clear: f32, mesh_capacity: usize, sprite_capacity: usize) -> Self {
        Self {
            mesh_entries: Vec::with_capacity(mesh_capacity),
            sprite_entries: Vec::with_capacity(sprite_capacity),
            per_frame: PerFrameConstants::default(),
            background_color,
            depth_clear,
        }
    }

    /// Overwrite the elapsed times; the last call in a frame wins
    pub fn set_elapsed_time(&mut self, system_seconds: f32, simulation_seconds: f32) {
        self.per_frame.elapsed_seconds_system = system_seconds;
        self.per_frame.elapsed_seconds_simulation = simulation_seconds;
    }

    /// Overwrite the background color; the last call in a frame wins
    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    /// Overwrite the depth clear value; the last call in a frame wins
    pub fn set_depth_clear(&mut self, depth: f32) {
        self.depth_clear = depth;
    }

    /// Store the camera transforms for a camera placed at `pose`
    pub fn set_camera(&mut self, camera: &Camera, pose: &Pose) {
        self.per_frame.world_to_camera = math::to_gpu(&Camera::view_matrix(pose));
        self.per_frame.camera_to_projected = math::to_gpu(&camera.projection_matrix());
    }

    /// Append a mesh entry
    pub fn push_mesh(&mut self, entry: MeshEntry) {
        self.mesh_entries.push(entry);
    }

    /// Append a sprite entry
    pub fn push_sprite(&mut self, entry: SpriteEntry) {
        self.sprite_entries.push(entry);
    }

    /// Mesh entries in submission order
    pub fn mesh_entries(&self) -> &[MeshEntry] {
        &self.mesh_entries
    }

    /// Sprite entries in submission order
    pub fn sprite_entries(&self) -> &[SpriteEntry] {
        &self.sprite_entries
    }

    /// Per-frame constants as they will be uploaded
    pub fn per_frame_constants(&self) -> &PerFrameConstants {
        &self.per_frame
    }

    /// World-to-camera transform for this frame
    pub fn world_to_camera(&self) -> Mat4 {
        self.per_frame.world_to_camera_matrix()
    }

    /// Color the color target is cleared to
    pub fn background_color(&self) -> Color {
        self.background_color
    }

    /// Value the depth target is cleared to
    pub fn depth_clear(&self) -> f32 {
        self.depth_clear
    }

    /// Number of mesh plus sprite entries
    pub fn entry_count(&self) -> usize {
        self.mesh_entries.len() + self.sprite_entries.len()
    }

    /// Whether the frame has no entries
    pub fn is_empty(&self) -> bool {
        self.mesh_entries.is_empty() && self.sprite_entries.is_empty()
    }

    /// Drop every entry, releasing their asset references, and keep the allocations
    ///
    /// Scalar state (colors, constants) is left as is. Returns how many entries
    /// were released.
    pub fn clear_entries(&mut self) -> usize {
        let released = self.entry_count();
        self.mesh_entries.clear();
        self.sprite_entries.clear();
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::resources::RenderState;

    fn entry(effect_state: RenderState) -> MeshEntry {
        MeshEntry {
            mesh: Arc::new(Mesh::quad("quad", 1.0, Color::WHITE).unwrap()),
            effect: Arc::new(Effect::new("fx", "v", "f", effect_state).unwrap()),
            texture: Arc::new(Texture::new("tex", 1, 1).unwrap()),
            position: Vec3::new(1.0, 2.0, 3.0),
            orientation: Quat::identity(),
        }
    }

    #[test]
    fn test_scalar_overwrite_last_call_wins() {
        let mut frame = FrameData::default();
        frame.set_background_color(Color::RED);
        frame.set_background_color(Color::BLUE);
        frame.set_depth_clear(0.5);
        frame.set_elapsed_time(1.0, 0.5);
        frame.set_elapsed_time(2.0, 1.5);

        assert_eq!(frame.background_color(), Color::BLUE);
        assert_eq!(frame.depth_clear(), 0.5);
        assert_eq!(frame.per_frame_constants().elapsed_seconds_system, 2.0);
        assert_eq!(frame.per_frame_constants().elapsed_seconds_simulation, 1.5);
    }

    #[test]
    fn test_clear_entries_releases_references() {
        let mut frame = FrameData::default();
        let mesh_entry = entry(RenderState::OPAQUE);
        let mesh = Arc::clone(&mesh_entry.mesh);
        frame.push_mesh(mesh_entry);
        assert_eq!(Arc::strong_count(&mesh), 2);

        assert_eq!(frame.clear_entries(), 1);
        assert!(frame.is_empty());
        assert_eq!(Arc::strong_count(&mesh), 1);
    }

    #[test]
    fn test_entry_transparency_comes_from_effect() {
        assert!(!entry(RenderState::OPAQUE).is_transparent());
        assert!(entry(RenderState::TRANSPARENT).is_transparent());
    }

    #[test]
    fn test_set_camera_stores_view() {
        let mut frame = FrameData::default();
        let pose = Pose::from_position(Vec3::new(0.0, 0.0, -5.0));
        frame.set_camera(&Camera::default(), &pose);
        assert_eq!(frame.world_to_camera(), pose.world_to_camera());
    }
}
