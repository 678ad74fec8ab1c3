//! # Render Queue
//!
//! Orders a frame's mesh entries into draw passes.
//!
//! - **RenderQueue**: Per-frame list of draw commands, reused across frames
//! - **RenderCommand**: Index into the frame's mesh entries plus its sort key
//! - **CommandType**: Opaque or transparent pass, from the entry's effect
//!
//! Opaque commands keep submission order. Transparent commands are drawn
//! back-to-front: descending camera-space depth, ties kept in submission
//! order. Sprites are not queued; they are drawn after both passes in
//! submission order.

use crate::foundation::math::{self, Mat4};
use crate::render::frame_data::MeshEntry;

/// Pass a render command belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    /// Drawn first, in submission order
    Opaque,
    /// Drawn after opaque, far to near
    Transparent,
}

/// One mesh entry scheduled for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCommand {
    /// Position of the entry in the frame's mesh entry list
    pub entry_index: usize,

    /// Pass the entry is drawn in
    pub command_type: CommandType,

    /// Camera-space depth of the entry's origin; only meaningful for transparent commands
    pub depth_key: f32,
}

/// Draw order for one frame's mesh entries
#[derive(Debug, Default)]
pub struct RenderQueue {
    opaque_commands: Vec<RenderCommand>,
    transparent_commands: Vec<RenderCommand>,
}

impl RenderQueue {
    /// Create an empty render queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a render queue with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            opaque_commands: Vec::with_capacity(capacity),
            transparent_commands: Vec::with_capacity(capacity / 4),
        }
    }

    /// Rebuild the queue from `entries` as seen through `world_to_camera`
    pub fn build(&mut self, entries: &[MeshEntry], world_to_camera: &Mat4) {
        self.clear();

        for (entry_index, entry) in entries.iter().enumerate() {
            if entry.is_transparent() {
                self.transparent_commands.push(RenderCommand {
                    entry_index,
                    command_type: CommandType::Transparent,
                    depth_key: math::camera_space_depth(world_to_camera, &entry.position),
                });
            } else {
                self.opaque_commands.push(RenderCommand {
                    entry_index,
                    command_type: CommandType::Opaque,
                    depth_key: 0.0,
                });
            }
        }

        // sort_by is stable, so equal depths stay in submission order
        self.transparent_commands
            .sort_by(|a, b| b.depth_key.total_cmp(&a.depth_key));
    }

    /// Opaque commands in submission order
    pub fn opaque_commands(&self) -> &[RenderCommand] {
        &self.opaque_commands
    }

    /// Transparent commands, farthest first
    pub fn transparent_commands(&self) -> &[RenderCommand] {
        &self.transparent_commands
    }

    /// Every command in draw order
    pub fn draw_order(&self) -> impl Iterator<Item = &RenderCommand> {
        self.opaque_commands.iter().chain(self.transparent_commands.iter())
    }

    /// Get total number of commands
    pub fn command_count(&self) -> usize {
        self.opaque_commands.len() + self.transparent_commands.len()
    }

    /// Clear all commands for next frame
    pub fn clear(&mut self) {
        self.opaque_commands.clear();
        self.transparent_commands.clear();
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.opaque_commands.is_empty() && self.transparent_commands.is_empty()
    }
}

/// Split `entries` into draw passes in one call
///
/// Returns entry indices: opaque in submission order, then transparent far
/// to near.
pub fn partition_and_sort(entries: &[MeshEntry], world_to_camera: &Mat4) -> (Vec<usize>, Vec<usize>) {
    let mut queue = RenderQueue::with_capacity(entries.len());
    queue.build(entries, world_to_camera);
    (
        queue.opaque_commands().iter().map(|c| c.entry_index).collect(),
        queue.transparent_commands().iter().map(|c| c.entry_index).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Pose, Quat, Vec3};
    use crate::render::{
        color::Color,
        resources::{Effect, Mesh, RenderState, Texture},
    };
    use std::sync::Arc;

    fn entry(z: f32, state: RenderState) -> MeshEntry {
        MeshEntry {
            mesh: Arc::new(Mesh::quad("quad", 1.0, Color::WHITE).unwrap()),
            effect: Arc::new(Effect::new("fx", "v", "f", state).unwrap()),
            texture: Arc::new(Texture::new("tex", 1, 1).unwrap()),
            position: Vec3::new(0.0, 0.0, z),
            orientation: Quat::identity(),
        }
    }

    #[test]
    fn test_render_queue_creation() {
        let queue = RenderQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.command_count(), 0);
    }

    #[test]
    fn test_opaque_keeps_submission_order() {
        let entries = vec![
            entry(9.0, RenderState::OPAQUE),
            entry(1.0, RenderState::OPAQUE),
            entry(5.0, RenderState::OPAQUE),
        ];
        let (opaque, transparent) = partition_and_sort(&entries, &Mat4::identity());
        assert_eq!(opaque, vec![0, 1, 2]);
        assert!(transparent.is_empty());
    }

    #[test]
    fn test_transparent_sorted_far_to_near() {
        let entries = vec![
            entry(2.0, RenderState::TRANSPARENT),
            entry(7.0, RenderState::OPAQUE),
            entry(10.0, RenderState::TRANSPARENT),
            entry(5.0, RenderState::TRANSPARENT),
        ];
        let (opaque, transparent) = partition_and_sort(&entries, &Mat4::identity());
        assert_eq!(opaque, vec![1]);
        assert_eq!(transparent, vec![2, 3, 0]);
    }

    #[test]
    fn test_equal_depths_keep_submission_order() {
        let entries = vec![
            entry(3.0, RenderState::TRANSPARENT),
            entry(3.0, RenderState::TRANSPARENT),
            entry(8.0, RenderState::TRANSPARENT),
            entry(3.0, RenderState::TRANSPARENT),
        ];
        let (_, transparent) = partition_and_sort(&entries, &Mat4::identity());
        assert_eq!(transparent, vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_depth_measured_in_camera_space() {
        // Camera at z = 10 makes the entry at z = 12 the nearest
        let view = Pose::from_position(Vec3::new(0.0, 0.0, 10.0)).world_to_camera();
        let entries = vec![
            entry(12.0, RenderState::TRANSPARENT),
            entry(20.0, RenderState::TRANSPARENT),
        ];
        let mut queue = RenderQueue::new();
        queue.build(&entries, &view);

        let keys: Vec<f32> = queue.transparent_commands().iter().map(|c| c.depth_key).collect();
        assert_eq!(keys, vec![10.0, 2.0]);
        assert_eq!(queue.draw_order().count(), 2);
    }

    #[test]
    fn test_rebuild_clears_previous_frame() {
        let mut queue = RenderQueue::new();
        queue.build(&[entry(1.0, RenderState::OPAQUE)], &Mat4::identity());
        queue.build(&[], &Mat4::identity());
        assert!(queue.is_empty());
    }
}
