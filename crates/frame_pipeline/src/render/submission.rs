//! Simulation-side submission API
//!
//! [`FrameSubmitter`] is the only way to write frame data. It is handed out
//! once by [`RenderSystem::initialize`](crate::render::RenderSystem::initialize)
//! and owned by the simulation thread. Each frame follows the same shape:
//!
//! ```text
//! wait_until_ready_for_submission -> submit_* ... -> signal_submission_complete
//! ```
//!
//! Calling a `submit_*` method outside that window is a caller bug and
//! panics instead of silently writing into a slot the renderer may own.

use std::sync::Arc;
use std::time::Duration;

use crate::foundation::math::{Pose, Quat, Vec3};
use crate::render::{
    camera::Camera,
    color::Color,
    frame_data::{FrameData, MeshEntry, SpriteEntry},
    render_system::SharedFrames,
    resources::{Effect, Mesh, Sprite, Texture},
    sync::{SyncError, WaitOutcome},
};

/// Submission handle owned by the simulation thread
pub struct FrameSubmitter {
    shared: Arc<SharedFrames>,
    default_timeout: Duration,
    window_open: bool,
    frames_submitted: u64,
}

impl FrameSubmitter {
    pub(crate) fn new(shared: Arc<SharedFrames>, default_timeout: Duration) -> Self {
        Self {
            shared,
            default_timeout,
            window_open: false,
            frames_submitted: 0,
        }
    }

    /// Block until the renderer has taken the previous frame, or `timeout` elapses
    ///
    /// On [`WaitOutcome::Signaled`] the submission window is open. On
    /// [`WaitOutcome::TimedOut`] nothing changes and the caller may retry or
    /// give up.
    pub fn wait_until_ready_for_submission(&mut self, timeout: Duration) -> Result<WaitOutcome, SyncError> {
        assert!(
            !self.window_open,
            "wait_until_ready_for_submission called twice without signal_submission_complete"
        );

        let outcome = self.shared.gate.wait_until_ready_for_submission(Some(timeout))?;
        if outcome == WaitOutcome::Signaled {
            self.window_open = true;
        } else {
            log::debug!("Timed out after {:?} waiting to submit frame {}", timeout, self.frames_submitted);
        }
        Ok(outcome)
    }

    /// [`wait_until_ready_for_submission`](Self::wait_until_ready_for_submission) with the configured timeout
    pub fn wait_until_ready(&mut self) -> Result<WaitOutcome, SyncError> {
        self.wait_until_ready_for_submission(self.default_timeout)
    }

    /// Close the submission window and hand the frame to the renderer
    pub fn signal_submission_complete(&mut self) -> Result<(), SyncError> {
        assert!(
            self.window_open,
            "signal_submission_complete called outside a submission window"
        );

        self.window_open = false;
        self.shared.gate.signal_submission_complete()?;
        self.frames_submitted += 1;
        Ok(())
    }

    /// Whether `submit_*` calls are currently allowed
    pub fn is_window_open(&self) -> bool {
        self.window_open
    }

    /// Number of frames handed to the renderer
    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Set the elapsed system and simulation time for this frame
    pub fn submit_elapsed_time(&self, system_seconds: f32, simulation_seconds: f32) {
        self.with_submit_slot("submit_elapsed_time", |frame| {
            frame.set_elapsed_time(system_seconds, simulation_seconds);
        });
    }

    /// Set the color the frame is cleared to
    pub fn submit_background_color(&self, color: Color) {
        self.with_submit_slot("submit_background_color", |frame| frame.set_background_color(color));
    }

    /// Set the value the depth buffer is cleared to
    pub fn submit_depth_clear(&self, depth: f32) {
        self.with_submit_slot("submit_depth_clear", |frame| frame.set_depth_clear(depth));
    }

    /// Set the camera and its world pose
    pub fn submit_camera(&self, camera: &Camera, position: Vec3, orientation: Quat) {
        let pose = Pose::new(position, orientation);
        self.with_submit_slot("submit_camera", |frame| frame.set_camera(camera, &pose));
    }

    /// Queue a mesh draw; the entry holds a reference to each asset until it is rendered
    pub fn submit_mesh(
        &self,
        mesh: &Arc<Mesh>,
        effect: &Arc<Effect>,
        texture: &Arc<Texture>,
        position: Vec3,
        orientation: Quat,
    ) {
        let entry = MeshEntry {
            mesh: Arc::clone(mesh),
            effect: Arc::clone(effect),
            texture: Arc::clone(texture),
            position,
            orientation,
        };
        self.with_submit_slot("submit_mesh", |frame| frame.push_mesh(entry));
    }

    /// Queue a sprite draw; the entry holds a reference to each asset until it is rendered
    pub fn submit_sprite(&self, sprite: &Arc<Sprite>, effect: &Arc<Effect>, texture: &Arc<Texture>) {
        let entry = SpriteEntry {
            sprite: Arc::clone(sprite),
            effect: Arc::clone(effect),
            texture: Arc::clone(texture),
        };
        self.with_submit_slot("submit_sprite", |frame| frame.push_sprite(entry));
    }

    /// Wake both threads and stop the pipeline
    ///
    /// Blocked waits on either side return [`SyncError::ShutDown`].
    pub fn request_shutdown(&self) {
        log::info!("Shutdown requested by the submitting thread");
        self.shared.gate.shut_down();
    }

    fn with_submit_slot<R>(&self, operation: &str, write: impl FnOnce(&mut FrameData) -> R) -> R {
        assert!(self.window_open, "{operation} called outside a submission window");

        match self.shared.slots.current_submit_slot() {
            Ok(mut frame) => write(&mut frame),
            Err(error) => panic!("{operation}: {error}"),
        }
    }
}
