//! # Camera
//!
//! Projection parameters for a perspective camera. The camera's pose is not
//! stored here; it is passed alongside the camera at submission time so the
//! simulation can interpolate it per frame.

use serde::{Serialize, Deserialize};
use std::f32::consts::FRAC_PI_4;

use crate::foundation::math::{self, Mat4, Pose};

/// Perspective camera projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Vertical field of view in radians
    pub vertical_fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            vertical_fov: FRAC_PI_4,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Create a perspective camera
    ///
    /// # Arguments
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height)
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        debug_assert!(near > 0.0 && far > near, "Invalid clip planes: near {near}, far {far}");
        Self {
            vertical_fov: math::utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Camera-to-projected transform
    pub fn projection_matrix(&self) -> Mat4 {
        math::perspective(self.vertical_fov, self.aspect, self.near, self.far)
    }

    /// World-to-camera transform for the camera placed at `pose`
    pub fn view_matrix(pose: &Pose) -> Mat4 {
        pose.world_to_camera()
    }
}
