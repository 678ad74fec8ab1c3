//! # Render System
//!
//! Render-thread half of the frame pipeline. [`RenderSystem::initialize`]
//! builds the two frame slots and the submission gate once and returns the
//! system together with the [`FrameSubmitter`] the simulation thread uses.
//!
//! Each [`render_frame`](RenderSystem::render_frame) call runs one cycle:
//!
//! 1. Wait for `submission complete`
//! 2. Swap slots and signal `ready for submission`
//! 3. Clear, upload per-frame constants, draw opaque then transparent meshes, draw sprites
//! 4. Present and release every entry in the slot
//!
//! Failures in step 1 or 2 halt the system. Backend failures in step 3 skip
//! the rest of the draws; step 4 always runs.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ConfigError;
use crate::core::RenderSystemConfig;
use crate::foundation::time::Stopwatch;
use crate::render::{
    backend::{BackendResult, RenderBackend},
    constants::PerDrawCallConstants,
    double_buffer::FrameSlots,
    frame_data::{FrameData, MeshEntry, SpriteEntry},
    render_queue::RenderQueue,
    submission::FrameSubmitter,
    sync::{SubmissionGate, SyncError, WaitOutcome},
    RenderError,
};

/// Errors that stop the render loop
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Waiting or signaling between the threads failed
    #[error("Frame synchronization failed: {0}")]
    Sync(#[from] SyncError),

    /// The backend failed outside a frame (initialize / clean up)
    #[error("Render backend failed: {0}")]
    Backend(#[from] RenderError),

    /// The configuration was rejected
    #[error("Invalid render system configuration: {0}")]
    Config(#[from] ConfigError),

    /// An earlier synchronization failure stopped the system
    #[error("Render system halted after an earlier failure")]
    Halted,

    /// The two threads touched the same frame slot
    #[error("Frame handoff contract violated: {0}")]
    ContractViolation(String),
}

impl PipelineError {
    /// Whether this is the orderly end of the pipeline rather than a failure
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Sync(SyncError::ShutDown(_)))
    }
}

/// State shared by the submitting and rendering threads
#[derive(Debug)]
pub(crate) struct SharedFrames {
    pub(crate) slots: FrameSlots,
    pub(crate) gate: SubmissionGate,
}

/// What one rendered frame contained
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Mesh entries in the frame
    pub mesh_entries: usize,
    /// Of which drawn in the transparent pass
    pub transparent_entries: usize,
    /// Sprite entries in the frame
    pub sprite_entries: usize,
    /// Draw calls the backend accepted
    pub draw_calls: usize,
    /// Entries released after presenting
    pub entries_released: usize,
    /// Backend failures absorbed this frame
    pub backend_failures: Vec<RenderError>,
}

impl FrameReport {
    /// Whether every backend call succeeded
    pub fn is_clean(&self) -> bool {
        self.backend_failures.is_empty()
    }
}

/// Result of a render cycle that did not fail
#[derive(Debug)]
pub enum FrameOutcome {
    /// A submitted frame was drawn and released
    Rendered(FrameReport),
    /// The configured render wait timeout elapsed with no submission
    NoSubmission,
}

/// Running counters kept by the render thread
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames drawn and released
    pub frames_rendered: u64,
    /// Mesh entries drawn across all frames
    pub mesh_entries_drawn: u64,
    /// Sprite entries drawn across all frames
    pub sprite_entries_drawn: u64,
    /// Entries released after rendering
    pub entries_released: u64,
    /// Backend failures absorbed
    pub backend_failures: u64,
    /// Render waits that timed out
    pub wait_timeouts: u64,
    /// Time spent drawing the last frame
    pub last_frame_micros: u64,
}

/// Wakes both pipeline threads from anywhere
#[derive(Clone)]
pub struct ShutdownHandle {
    shared: Arc<SharedFrames>,
}

impl ShutdownHandle {
    /// Make every blocked or later wait return [`SyncError::ShutDown`]
    pub fn request_shutdown(&self) {
        log::info!("Pipeline shutdown requested");
        self.shared.gate.shut_down();
    }
}

impl fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownHandle").finish_non_exhaustive()
    }
}

type UserOutput = Box<dyn FnMut(&str) + Send>;

/// Render-thread side of the frame pipeline
pub struct RenderSystem<B: RenderBackend> {
    shared: Arc<SharedFrames>,
    backend: B,
    config: RenderSystemConfig,
    queue: RenderQueue,
    stats: FrameStats,
    halted: bool,
    user_output: UserOutput,
}

impl<B: RenderBackend> RenderSystem<B> {
    /// Create both frame slots and the gate, then initialize the backend
    pub fn initialize(config: RenderSystemConfig, mut backend: B) -> Result<(Self, FrameSubmitter), PipelineError> {
        config.validate()?;
        backend.initialize()?;

        let shared = Arc::new(SharedFrames {
            slots: FrameSlots::new(|| {
                FrameData::new(
                    config.default_background_color,
                    config.default_depth_clear,
                    config.initial_mesh_capacity,
                    config.initial_sprite_capacity,
                )
            }),
            gate: SubmissionGate::new(),
        });
        let submitter = FrameSubmitter::new(Arc::clone(&shared), config.submission_timeout());

        log::info!(
            "Render system initialized (submission timeout {:?}, render wait timeout {:?})",
            config.submission_timeout(),
            config.render_wait_timeout()
        );

        let system = Self {
            shared,
            backend,
            queue: RenderQueue::with_capacity(config.initial_mesh_capacity),
            config,
            stats: FrameStats::default(),
            halted: false,
            user_output: Box::new(|message: &str| eprintln!("{message}")),
        };
        Ok((system, submitter))
    }

    /// Replace where fatal failures are reported; stderr by default
    pub fn set_user_output(&mut self, output: impl FnMut(&str) + Send + 'static) {
        self.user_output = Box::new(output);
    }

    /// Handle that can stop the pipeline from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Wake both threads and stop the pipeline
    pub fn request_shutdown(&self) {
        self.shutdown_handle().request_shutdown();
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Whether a synchronization failure has stopped the system
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The backend, for inspection
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run one wait, swap, draw, release cycle
    pub fn render_frame(&mut self) -> Result<FrameOutcome, PipelineError> {
        if self.halted {
            return Err(PipelineError::Halted);
        }

        let shared = Arc::clone(&self.shared);

        match shared.gate.wait_for_submission(self.config.render_wait_timeout()) {
            Ok(WaitOutcome::Signaled) => {}
            Ok(WaitOutcome::TimedOut) => {
                self.stats.wait_timeouts += 1;
                log::warn!("No frame submitted within {:?}", self.config.render_wait_timeout());
                return Ok(FrameOutcome::NoSubmission);
            }
            Err(error) => return Err(self.halt(error.into())),
        }

        shared.slots.swap();
        if let Err(error) = shared.gate.signal_ready_for_submission() {
            return Err(self.halt(error.into()));
        }

        let mut frame = match shared.slots.current_render_slot() {
            Ok(frame) => frame,
            Err(error) => return Err(self.halt(PipelineError::ContractViolation(error.to_string()))),
        };

        let stopwatch = Stopwatch::start_new();
        let mut report = self.draw(&frame);
        report.entries_released = frame.clear_entries();
        drop(frame);

        self.record(&report, stopwatch.elapsed_micros());
        Ok(FrameOutcome::Rendered(report))
    }

    /// Render frames until the pipeline shuts down or fails
    ///
    /// Returns the number of frames rendered when shut down cleanly.
    pub fn run_render_loop(&mut self) -> Result<u64, PipelineError> {
        log::info!("Render loop started");
        loop {
            match self.render_frame() {
                Ok(_) => {}
                Err(error) if error.is_shutdown() => {
                    log::info!("Render loop stopped after {} frames", self.stats.frames_rendered);
                    return Ok(self.stats.frames_rendered);
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Shut the pipeline down, release every entry still held by either slot, and clean up the backend
    ///
    /// Returns the number of entries released.
    pub fn clean_up(mut self) -> Result<usize, PipelineError> {
        self.shared.gate.shut_down();

        let released = self.shared.slots.drain_all();
        if released > 0 {
            log::info!("Released {released} unrendered entries during clean up");
        }

        self.backend.clean_up()?;
        log::info!("Render system cleaned up after {} frames", self.stats.frames_rendered);
        Ok(released)
    }

    fn draw(&mut self, frame: &FrameData) -> FrameReport {
        self.queue.build(frame.mesh_entries(), &frame.world_to_camera());

        let mut report = FrameReport {
            mesh_entries: frame.mesh_entries().len(),
            transparent_entries: self.queue.transparent_commands().len(),
            sprite_entries: frame.sprite_entries().len(),
            ..FrameReport::default()
        };

        if let Err(error) = self.issue_draws(frame, &mut report.draw_calls) {
            log::error!("Backend failure, skipping the rest of the frame: {error}");
            report.backend_failures.push(error);
        }

        if let Err(error) = self.backend.present() {
            log::error!("Present failed: {error}");
            report.backend_failures.push(error);
        }

        report
    }

    fn issue_draws(&mut self, frame: &FrameData, draw_calls: &mut usize) -> BackendResult<()> {
        let slot = self.config.texture_slot;

        self.backend.clear_color(frame.background_color())?;
        self.backend.clear_depth(frame.depth_clear())?;
        self.backend.update_per_frame_constants(frame.per_frame_constants())?;

        let entries = frame.mesh_entries();
        for command in self.queue.draw_order() {
            draw_mesh_entry(&mut self.backend, &entries[command.entry_index], slot)?;
            *draw_calls += 1;
        }

        for entry in frame.sprite_entries() {
            draw_sprite_entry(&mut self.backend, entry, slot)?;
            *draw_calls += 1;
        }

        Ok(())
    }

    fn record(&mut self, report: &FrameReport, micros: u64) {
        self.stats.frames_rendered += 1;
        self.stats.mesh_entries_drawn += report.mesh_entries as u64;
        self.stats.sprite_entries_drawn += report.sprite_entries as u64;
        self.stats.entries_released += report.entries_released as u64;
        self.stats.backend_failures += report.backend_failures.len() as u64;
        self.stats.last_frame_micros = micros;

        log::debug!(
            "Frame {}: {} meshes ({} transparent), {} sprites, {} draws in {}us",
            self.stats.frames_rendered,
            report.mesh_entries,
            report.transparent_entries,
            report.sprite_entries,
            report.draw_calls,
            micros
        );
    }

    fn halt(&mut self, error: PipelineError) -> PipelineError {
        if error.is_shutdown() {
            log::info!("Pipeline shut down; render thread stopping");
            return error;
        }

        self.halted = true;
        log::error!("Render loop halted: {error}");
        (self.user_output)(&format!("Rendering stopped: {error}"));
        error
    }
}

fn draw_mesh_entry<B: RenderBackend>(backend: &mut B, entry: &MeshEntry, slot: u32) -> BackendResult<()> {
    backend.update_per_draw_call_constants(&PerDrawCallConstants::new(&entry.local_to_world()))?;
    backend.bind_effect(&entry.effect)?;
    backend.bind_texture(&entry.texture, slot)?;
    backend.draw_mesh(&entry.mesh)
}

fn draw_sprite_entry<B: RenderBackend>(backend: &mut B, entry: &SpriteEntry, slot: u32) -> BackendResult<()> {
    backend.bind_effect(&entry.effect)?;
    backend.bind_texture(&entry.texture, slot)?;
    backend.draw_sprite(&entry.sprite)
}
