//! Simulated scene: bouncing, spinning quads plus a sprite overlay
//!
//! All assets live in asset managers. The scene fetches shared references
//! every frame and hands them to the submitter, so the managers' reference
//! counts show how many frames still hold each asset.

use std::f32::consts::TAU;

use frame_pipeline::assets::{AssetError, AssetHandle, AssetManager};
use frame_pipeline::foundation::math::{utils, Quat, Unit, Vec2, Vec3};
use frame_pipeline::foundation::time::Timer;
use frame_pipeline::render::{Camera, Color, Effect, FrameSubmitter, Mesh, RenderState, Sprite, Texture};
use rand::Rng;

use crate::demo_config::DemoConfig;

const PALETTE: [Color; 6] = [
    Color::EMERALD,
    Color::ORANGE,
    Color::PURPLE,
    Color::SILVER,
    Color::TURQUOISE,
    Color::YELLOW,
];

struct SceneObject {
    mesh: AssetHandle<Mesh>,
    transparent: bool,
    position: Vec3,
    velocity: Vec3,
    orientation: Quat,
    spin_axis: Unit<Vec3>,
    spin_rate: f32,
}

/// Reference counts of every scene asset, manager reference included
#[derive(Debug, Default)]
pub struct ReferenceReport {
    /// (asset kind, index, strong count)
    pub counts: Vec<(&'static str, usize, usize)>,
}

impl ReferenceReport {
    /// Whether every asset is held only by its manager
    pub fn is_balanced(&self) -> bool {
        self.counts.iter().all(|&(_, _, count)| count == 1)
    }
}

/// Demo scene and the assets it draws
pub struct DemoScene {
    meshes: AssetManager<Mesh>,
    effects: AssetManager<Effect>,
    textures: AssetManager<Texture>,
    sprites: AssetManager<Sprite>,
    mesh_handles: Vec<AssetHandle<Mesh>>,
    opaque_effect: AssetHandle<Effect>,
    transparent_effect: AssetHandle<Effect>,
    overlay_effect: AssetHandle<Effect>,
    texture: AssetHandle<Texture>,
    sprite_handles: Vec<AssetHandle<Sprite>>,
    objects: Vec<SceneObject>,
    camera: Camera,
    camera_position: Vec3,
    arena_half_size: f32,
}

impl DemoScene {
    /// Load the scene's assets and scatter its objects
    pub fn new(config: &DemoConfig, rng: &mut impl Rng) -> Result<Self, AssetError> {
        let meshes = AssetManager::new("mesh");
        let effects = AssetManager::new("effect");
        let textures = AssetManager::new("texture");
        let sprites = AssetManager::new("sprite");

        let mut mesh_handles = Vec::with_capacity(PALETTE.len());
        for (index, color) in PALETTE.iter().enumerate() {
            mesh_handles.push(meshes.load(Mesh::quad(format!("quad_{index}"), 0.5, *color)?)?);
        }

        let opaque_effect = effects.load(Effect::new("standard", "vs_standard", "fs_standard", RenderState::OPAQUE)?)?;
        let transparent_effect = effects.load(Effect::new(
            "blended",
            "vs_standard",
            "fs_blended",
            RenderState::TRANSPARENT | RenderState::DRAW_BOTH_TRIANGLE_SIDES,
        )?)?;
        let overlay_effect = effects.load(Effect::new(
            "overlay",
            "vs_sprite",
            "fs_sprite",
            RenderState::ALPHA_TRANSPARENCY,
        )?)?;
        let texture = textures.load(Texture::new("checker", 64, 64)?)?;

        let mut sprite_handles = Vec::with_capacity(config.sprites);
        for index in 0..config.sprites {
            let x = -0.8 + 0.3 * index as f32;
            sprite_handles.push(sprites.load(Sprite::new(
                format!("hud_{index}"),
                Vec2::new(x, 0.85),
                Vec2::new(0.1, 0.1),
            )?)?);
        }

        let half = config.arena_half_size;
        let object_count = config.opaque_objects + config.transparent_objects;
        let objects = (0..object_count)
            .map(|index| SceneObject {
                mesh: mesh_handles[index % mesh_handles.len()],
                transparent: index >= config.opaque_objects,
                position: Vec3::new(
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                ),
                velocity: Vec3::new(
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-3.0..3.0),
                ),
                orientation: Quat::identity(),
                spin_axis: Unit::new_normalize(Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(0.1..1.0),
                    rng.gen_range(-1.0..1.0),
                )),
                spin_rate: rng.gen_range(0.2..TAU),
            })
            .collect();

        let camera = Camera::perspective(
            config.camera.fov_degrees,
            config.camera.aspect,
            0.1,
            half * 4.0 + config.camera.distance,
        );

        log::info!(
            "Scene loaded: {} meshes, {} effects, {} textures, {} sprites, {} objects",
            meshes.len(),
            effects.len(),
            textures.len(),
            sprites.len(),
            object_count
        );

        Ok(Self {
            meshes,
            effects,
            textures,
            sprites,
            mesh_handles,
            opaque_effect,
            transparent_effect,
            overlay_effect,
            texture,
            sprite_handles,
            objects,
            camera,
            camera_position: Vec3::new(0.0, 0.0, -config.camera.distance),
            arena_half_size: half,
        })
    }

    /// Advance the simulation by `delta_seconds`
    pub fn update(&mut self, delta_seconds: f32) {
        let half = self.arena_half_size;
        for object in &mut self.objects {
            object.position += object.velocity * delta_seconds;
            for axis in 0..3 {
                if object.position[axis].abs() > half {
                    object.position[axis] = utils::clamp(object.position[axis], -half, half);
                    object.velocity[axis] = -object.velocity[axis];
                }
            }

            let step = Quat::from_axis_angle(&object.spin_axis, object.spin_rate * delta_seconds);
            object.orientation = step * object.orientation;
        }
    }

    /// Submit this frame's state; the submission window must be open
    pub fn submit(&self, submitter: &FrameSubmitter, timer: &Timer) -> Result<(), AssetError> {
        let t = timer.total_time();
        submitter.submit_elapsed_time(t, t);
        submitter.submit_background_color(Color::rgb(0.02, 0.02, 0.05 + 0.05 * (t * 0.5).sin().abs()));
        submitter.submit_depth_clear(1.0);
        submitter.submit_camera(&self.camera, self.camera_position, Quat::identity());

        let texture = self.textures.get(self.texture)?;
        let opaque = self.effects.get(self.opaque_effect)?;
        let transparent = self.effects.get(self.transparent_effect)?;

        for object in &self.objects {
            let mesh = self.meshes.get(object.mesh)?;
            let effect = if object.transparent { &transparent } else { &opaque };
            submitter.submit_mesh(&mesh, effect, &texture, object.position, object.orientation);
        }

        let overlay = self.effects.get(self.overlay_effect)?;
        for &handle in &self.sprite_handles {
            submitter.submit_sprite(&self.sprites.get(handle)?, &overlay, &texture);
        }

        Ok(())
    }

    /// Current reference count of every asset the scene loaded
    pub fn reference_report(&self) -> Result<ReferenceReport, AssetError> {
        let mut report = ReferenceReport::default();
        for (index, &handle) in self.mesh_handles.iter().enumerate() {
            report.counts.push(("mesh", index, self.meshes.reference_count(handle)?));
        }
        for (index, handle) in [self.opaque_effect, self.transparent_effect, self.overlay_effect]
            .into_iter()
            .enumerate()
        {
            report.counts.push(("effect", index, self.effects.reference_count(handle)?));
        }
        report.counts.push(("texture", 0, self.textures.reference_count(self.texture)?));
        for (index, &handle) in self.sprite_handles.iter().enumerate() {
            report.counts.push(("sprite", index, self.sprites.reference_count(handle)?));
        }
        Ok(report)
    }

    /// Release every asset the scene loaded
    pub fn release(self) -> Result<(), AssetError> {
        for handle in self.mesh_handles {
            self.meshes.release(handle)?;
        }
        for handle in [self.opaque_effect, self.transparent_effect, self.overlay_effect] {
            self.effects.release(handle)?;
        }
        self.textures.release(self.texture)?;
        for handle in self.sprite_handles {
            self.sprites.release(handle)?;
        }
        log::debug!(
            "Scene released; {} assets still loaded",
            self.meshes.len() + self.effects.len() + self.textures.len() + self.sprites.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn scene() -> DemoScene {
        let config = DemoConfig {
            opaque_objects: 3,
            transparent_objects: 2,
            sprites: 1,
            ..DemoConfig::default()
        };
        DemoScene::new(&config, &mut StdRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn test_objects_stay_inside_arena() {
        let mut scene = scene();
        for _ in 0..500 {
            scene.update(0.1);
        }
        let half = scene.arena_half_size;
        for object in &scene.objects {
            assert!(object.position.iter().all(|c| c.abs() <= half));
        }
    }

    #[test]
    fn test_fresh_scene_is_balanced() {
        let scene = scene();
        let report = scene.reference_report().unwrap();
        assert!(report.is_balanced());
        assert_eq!(report.counts.len(), PALETTE.len() + 3 + 1 + 1);
        scene.release().unwrap();
    }
}
