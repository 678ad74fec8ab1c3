//! Pipeline tests spanning submission, handoff and the render procedure
//!
//! Shared fixtures live here; the scenarios are split by concern.

mod frame_procedure;

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::core::RenderSystemConfig;
use crate::foundation::math::Vec2;
use crate::render::{
    recording_backend::{CommandLog, DrawCommand, RecordingBackend},
    Color, Effect, FrameSubmitter, Mesh, PipelineError, RenderState, RenderSystem, Sprite, Texture, WaitOutcome,
};

/// Generous timeout so slow CI machines never see a spurious timeout
pub(super) const WAIT: Duration = Duration::from_secs(5);

pub(super) type TestSystem = RenderSystem<RecordingBackend>;

/// Pipeline over a recording backend, with the initialize call already drained from the log
pub(super) fn pipeline() -> (TestSystem, FrameSubmitter, CommandLog) {
    pipeline_with(RenderSystemConfig::default(), RecordingBackend::new())
}

pub(super) fn pipeline_with(
    config: RenderSystemConfig,
    (backend, log): (RecordingBackend, CommandLog),
) -> (TestSystem, FrameSubmitter, CommandLog) {
    let (system, submitter) = RenderSystem::initialize(config, backend).unwrap();
    assert_eq!(log.take(), vec![DrawCommand::Initialize]);
    (system, submitter, log)
}

pub(super) fn mesh(name: &str) -> Arc<Mesh> {
    Arc::new(Mesh::quad(name, 0.5, Color::WHITE).unwrap())
}

pub(super) fn opaque_effect() -> Arc<Effect> {
    Arc::new(Effect::new("opaque", "vs_standard", "fs_standard", RenderState::OPAQUE).unwrap())
}

pub(super) fn transparent_effect() -> Arc<Effect> {
    Arc::new(Effect::new("transparent", "vs_standard", "fs_blended", RenderState::TRANSPARENT).unwrap())
}

pub(super) fn texture(name: &str) -> Arc<Texture> {
    Arc::new(Texture::new(name, 16, 16).unwrap())
}

pub(super) fn sprite(name: &str) -> Arc<Sprite> {
    Arc::new(Sprite::new(name, Vec2::new(0.0, 0.0), Vec2::new(0.25, 0.25)).unwrap())
}

/// Open the submission window, panicking if it does not open
pub(super) fn open_window(submitter: &mut FrameSubmitter) {
    assert_eq!(submitter.wait_until_ready_for_submission(WAIT), Ok(WaitOutcome::Signaled));
}

/// Run the render loop on its own thread until shutdown
pub(super) fn spawn_renderer(mut system: TestSystem) -> JoinHandle<(TestSystem, Result<u64, PipelineError>)> {
    thread::Builder::new()
        .name("render".into())
        .spawn(move || {
            let result = system.run_render_loop();
            (system, result)
        })
        .unwrap()
}

/// Split a command stream into one slice per presented frame
pub(super) fn frames(commands: &[DrawCommand]) -> Vec<&[DrawCommand]> {
    commands
        .split_inclusive(|command| *command == DrawCommand::Present)
        .filter(|frame| frame.last() == Some(&DrawCommand::Present))
        .collect()
}
