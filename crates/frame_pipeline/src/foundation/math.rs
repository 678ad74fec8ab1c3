//! Math utilities and types
//!
//! Provides the vector, quaternion and matrix types the pipeline consumes as
//! plain values, plus the handful of transforms the render procedure needs.
//!
//! # Coordinate System
//! View space is left-handed with the camera looking down its local +Z axis:
//! - X+ = Right
//! - Y+ = Up
//! - Z+ = Forward (away from the viewer)
//!
//! A point in front of the camera therefore has a positive camera-space z,
//! and that z is used directly as the camera-space depth.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix4,
    Quaternion,
    Unit,
};
use nalgebra::{Isometry3, Point3, Translation3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Column-major matrix layout used by GPU constant buffers
pub type GpuMat4 = [[f32; 4]; 4];

/// Rigid pose: position and orientation, no scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Position in world space
    pub position: Vec3,

    /// Orientation in world space
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
        }
    }
}

impl Pose {
    /// Create a pose from a position and orientation
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    /// Create a pose with identity orientation
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    fn isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position), self.orientation)
    }

    /// Local-to-world matrix for an object with this pose
    pub fn local_to_world(&self) -> Mat4 {
        self.isometry().to_homogeneous()
    }

    /// World-to-camera matrix for a camera with this pose
    ///
    /// This is the inverse of the camera's local-to-world transform.
    pub fn world_to_camera(&self) -> Mat4 {
        self.isometry().inverse().to_homogeneous()
    }
}

/// Left-handed perspective projection mapping view depth `near..far` to `0..1`
///
/// # Arguments
/// * `vertical_fov` - Vertical field of view in radians
/// * `aspect` - Width / height
/// * `near` - Distance to near plane (> 0)
/// * `far` - Distance to far plane (> near)
pub fn perspective(vertical_fov: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let y_scale = 1.0 / (vertical_fov * 0.5).tan();
    let x_scale = y_scale / aspect;
    let z_range = far / (far - near);

    Mat4::new(
        x_scale, 0.0, 0.0, 0.0,
        0.0, y_scale, 0.0, 0.0,
        0.0, 0.0, z_range, -near * z_range,
        0.0, 0.0, 1.0, 0.0,
    )
}

/// Camera-space depth of a world position under a world-to-camera transform
pub fn camera_space_depth(world_to_camera: &Mat4, position: &Vec3) -> f32 {
    world_to_camera.transform_point(&Point3::from(*position)).z
}

/// Convert a matrix to the column-major layout used by constant buffers
pub fn to_gpu(matrix: &Mat4) -> GpuMat4 {
    (*matrix).into()
}

/// Convert a constant buffer matrix back to a math matrix
pub fn from_gpu(matrix: &GpuMat4) -> Mat4 {
    Mat4::from(*matrix)
}

/// Math utility functions
pub mod utils {
    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees.to_radians()
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        value.max(min).min(max)
    }
}
