//! Constant buffer layouts
//!
//! Plain-old-data structs the backend uploads byte-for-byte. Matrices are
//! column-major and every struct is padded to a multiple of 16 bytes.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{self, GpuMat4, Mat4};

/// Per-frame constants, uploaded once per rendered frame
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PerFrameConstants {
    /// World-to-camera transform
    pub world_to_camera: GpuMat4,
    /// Camera-to-projected transform
    pub camera_to_projected: GpuMat4,
    /// Seconds since the application started
    pub elapsed_seconds_system: f32,
    /// Seconds of simulated time
    pub elapsed_seconds_simulation: f32,
    /// Keeps the struct 16-byte aligned
    pub _padding: [f32; 2],
}

impl Default for PerFrameConstants {
    fn default() -> Self {
        let identity = math::to_gpu(&Mat4::identity());
        Self {
            world_to_camera: identity,
            camera_to_projected: identity,
            elapsed_seconds_system: 0.0,
            elapsed_seconds_simulation: 0.0,
            _padding: [0.0; 2],
        }
    }
}

impl PerFrameConstants {
    /// World-to-camera transform as a math matrix
    pub fn world_to_camera_matrix(&self) -> Mat4 {
        math::from_gpu(&self.world_to_camera)
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Per-draw-call constants, uploaded before every mesh draw
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PerDrawCallConstants {
    /// Local-to-world transform of the mesh being drawn
    pub local_to_world: GpuMat4,
}

impl PerDrawCallConstants {
    /// Constants for a mesh drawn with the given local-to-world transform
    pub fn new(local_to_world: &Mat4) -> Self {
        Self {
            local_to_world: math::to_gpu(local_to_world),
        }
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
