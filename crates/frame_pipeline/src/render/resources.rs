//! # Drawable Resources
//!
//! CPU-side descriptions of the assets a frame entry references. They are
//! shared between threads behind `Arc`, so every type here is immutable after
//! construction and validates its data up front.
//!
//! - **Effect**: shader pair plus the [`RenderState`] that decides opaque vs transparent
//! - **Mesh**: indexed triangle list with per-vertex colors
//! - **Sprite**: screen-space quad defined by origin and half extents
//! - **Texture**: named image bound to a sampler slot

use bitflags::bitflags;

use crate::assets::AssetError;
use crate::foundation::math::{Vec2, Vec3};
use crate::render::color::Color;

bitflags! {
    /// Fixed-function state an effect binds alongside its shaders
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderState: u8 {
        /// Alpha blending; entries drawn with this effect are sorted back-to-front
        const ALPHA_TRANSPARENCY = 1 << 0;
        /// Fragments are tested against the depth buffer
        const DEPTH_TESTING = 1 << 1;
        /// Fragments write to the depth buffer
        const DEPTH_WRITING = 1 << 2;
        /// Back-face culling is disabled
        const DRAW_BOTH_TRIANGLE_SIDES = 1 << 3;
    }
}

impl RenderState {
    /// Depth-tested, depth-writing, culled, no blending
    pub const OPAQUE: Self = Self::DEPTH_TESTING.union(Self::DEPTH_WRITING);

    /// Blended and depth-tested but not depth-writing
    pub const TRANSPARENT: Self = Self::ALPHA_TRANSPARENCY.union(Self::DEPTH_TESTING);

    /// Whether alpha blending is enabled
    pub fn is_alpha_transparency_enabled(self) -> bool {
        self.contains(Self::ALPHA_TRANSPARENCY)
    }

    /// Whether depth testing is enabled
    pub fn is_depth_testing_enabled(self) -> bool {
        self.contains(Self::DEPTH_TESTING)
    }

    /// Whether depth writing is enabled
    pub fn is_depth_writing_enabled(self) -> bool {
        self.contains(Self::DEPTH_WRITING)
    }

    /// Whether both triangle faces are drawn
    pub fn should_both_triangle_sides_be_drawn(self) -> bool {
        self.contains(Self::DRAW_BOTH_TRIANGLE_SIDES)
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// Shader pair and render state bound before a draw call
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    name: String,
    vertex_shader: String,
    fragment_shader: String,
    render_state: RenderState,
}

impl Effect {
    /// Create an effect from shader names and render state
    pub fn new(
        name: impl Into<String>,
        vertex_shader: impl Into<String>,
        fragment_shader: impl Into<String>,
        render_state: RenderState,
    ) -> Result<Self, AssetError> {
        let name = name.into();
        let vertex_shader = vertex_shader.into();
        let fragment_shader = fragment_shader.into();

        if vertex_shader.is_empty() || fragment_shader.is_empty() {
            return Err(AssetError::InvalidData {
                asset: name,
                reason: "effect needs both a vertex and a fragment shader".to_string(),
            });
        }

        Ok(Self {
            name,
            vertex_shader,
            fragment_shader,
            render_state,
        })
    }

    /// Debug name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vertex shader name
    pub fn vertex_shader(&self) -> &str {
        &self.vertex_shader
    }

    /// Fragment shader name
    pub fn fragment_shader(&self) -> &str {
        &self.fragment_shader
    }

    /// Render state bound with this effect
    pub fn render_state(&self) -> RenderState {
        self.render_state
    }
}

const VERTICES_PER_TRIANGLE: usize = 3;

/// Indexed triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    name: String,
    positions: Vec<Vec3>,
    colors: Vec<Color>,
    indices: Vec<u16>,
}

impl Mesh {
    /// Create a mesh
    ///
    /// `colors` must be empty (white) or match `positions` in length. The index
    /// list must describe whole triangles and only address existing vertices.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        indices: Vec<u16>,
        colors: Vec<Color>,
    ) -> Result<Self, AssetError> {
        let name = name.into();
        let invalid = |reason: String| AssetError::InvalidData {
            asset: name.clone(),
            reason,
        };

        if positions.is_empty() || indices.is_empty() {
            return Err(invalid("mesh has no geometry".to_string()));
        }
        if positions.len() > usize::from(u16::MAX) + 1 {
            return Err(invalid(format!("{} vertices exceed 16-bit indexing", positions.len())));
        }
        if indices.len() % VERTICES_PER_TRIANGLE != 0 {
            return Err(invalid(format!("{} indices is not a whole number of triangles", indices.len())));
        }
        if let Some(index) = indices.iter().find(|&&i| usize::from(i) >= positions.len()) {
            return Err(invalid(format!("index {index} out of range for {} vertices", positions.len())));
        }
        if !colors.is_empty() && colors.len() != positions.len() {
            return Err(invalid(format!("{} colors for {} vertices", colors.len(), positions.len())));
        }

        let colors = if colors.is_empty() {
            vec![Color::WHITE; positions.len()]
        } else {
            colors
        };

        Ok(Self {
            name,
            positions,
            colors,
            indices,
        })
    }

    /// Axis-aligned quad in the XY plane centered on the origin
    pub fn quad(name: impl Into<String>, half_extent: f32, color: Color) -> Result<Self, AssetError> {
        let h = half_extent;
        Self::new(
            name,
            vec![
                Vec3::new(-h, -h, 0.0),
                Vec3::new(h, -h, 0.0),
                Vec3::new(h, h, 0.0),
                Vec3::new(-h, h, 0.0),
            ],
            vec![0, 2, 1, 0, 3, 2],
            vec![color; 4],
        )
    }

    /// Debug name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vertex positions
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Vertex colors, one per position
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Triangle indices
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / VERTICES_PER_TRIANGLE
    }
}

/// Screen-space quad drawn as a 2D overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    name: String,
    origin: Vec2,
    extents: Vec2,
}

impl Sprite {
    /// Create a sprite centered at `origin` with half-size `extents`, in clip space
    pub fn new(name: impl Into<String>, origin: Vec2, extents: Vec2) -> Result<Self, AssetError> {
        let name = name.into();
        if !(extents.x > 0.0 && extents.y > 0.0) {
            return Err(AssetError::InvalidData {
                asset: name,
                reason: format!("sprite extents must be positive, got ({}, {})", extents.x, extents.y),
            });
        }
        Ok(Self { name, origin, extents })
    }

    /// Debug name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Center of the quad
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Half-size of the quad
    pub fn extents(&self) -> Vec2 {
        self.extents
    }

    /// Corner positions as a triangle strip: bottom-right, top-right, bottom-left, top-left
    pub fn vertices(&self) -> [Vec2; 4] {
        let (o, e) = (self.origin, self.extents);
        [
            Vec2::new(o.x + e.x, o.y - e.y),
            Vec2::new(o.x + e.x, o.y + e.y),
            Vec2::new(o.x - e.x, o.y - e.y),
            Vec2::new(o.x - e.x, o.y + e.y),
        ]
    }
}

/// Named image bound to a sampler slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    name: String,
    width: u32,
    height: u32,
}

impl Texture {
    /// Create a texture description
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Result<Self, AssetError> {
        let name = name.into();
        if width == 0 || height == 0 {
            return Err(AssetError::InvalidData {
                asset: name,
                reason: format!("texture dimensions {width}x{height} are empty"),
            });
        }
        Ok(Self { name, width, height })
    }

    /// Debug name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width in texels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels
    pub fn height(&self) -> u32 {
        self.height
    }
}
