//! Frame pipeline demo
//!
//! Runs a headless simulation thread and render thread against the recording
//! backend, then checks that every asset reference handed to the pipeline
//! came back.
//!
//! ```text
//! pipeline_demo [config.toml | config.ron]
//! ```

mod demo_config;
mod scene;

use std::thread;
use std::time::Duration;

use frame_pipeline::assets::AssetError;
use frame_pipeline::config::{Config, ConfigError};
use frame_pipeline::foundation::{logging, time::Timer};
use frame_pipeline::render::{FrameSubmitter, PipelineError, RecordingBackend, RenderSystem, SyncError, WaitOutcome};
use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;

use demo_config::DemoConfig;
use scene::DemoScene;

#[derive(Debug, Error)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Frame synchronization error: {0}")]
    Sync(#[from] SyncError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Render thread panicked")]
    RenderThreadPanicked,

    #[error("{0} asset reference(s) were not returned by the pipeline")]
    LeakedReferences(usize),
}

fn load_config() -> Result<DemoConfig, ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => DemoConfig::load_from_file(&path)?,
        None => DemoConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Submit `config.frames` frames, then wait until the renderer has taken the last one
fn simulate(submitter: &mut FrameSubmitter, scene: &mut DemoScene, config: &DemoConfig) -> Result<(), DemoError> {
    let mut timer = Timer::new();
    let mut skipped = 0_u64;

    for _ in 0..config.frames {
        if submitter.wait_until_ready()? == WaitOutcome::TimedOut {
            skipped += 1;
            log::warn!("Renderer did not take the previous frame in time; skipping a frame");
            continue;
        }

        timer.update();
        scene.update(timer.delta_time());
        let submitted = scene.submit(submitter, &timer);
        // The window must close even if submission failed, or the renderer never wakes
        submitter.signal_submission_complete()?;
        submitted?;

        if config.frame_sleep_ms > 0 {
            thread::sleep(Duration::from_millis(config.frame_sleep_ms));
        }
    }

    if submitter.wait_until_ready()? == WaitOutcome::TimedOut {
        log::warn!("Renderer did not take the final frame before shutdown");
    }

    log::info!(
        "Simulation finished: {} frames submitted, {} skipped, {:.1} fps",
        submitter.frames_submitted(),
        skipped,
        timer.average_fps()
    );
    Ok(())
}

fn run(config: DemoConfig) -> Result<(), DemoError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut scene = DemoScene::new(&config, &mut rng)?;

    let (backend, command_log) = RecordingBackend::new();
    let (mut renderer, mut submitter) = RenderSystem::initialize(config.pipeline.render.clone(), backend)?;

    let render_thread = thread::Builder::new().name("render".into()).spawn(move || {
        let result = renderer.run_render_loop();
        (renderer, result)
    })?;

    let simulated = simulate(&mut submitter, &mut scene, &config);

    submitter.request_shutdown();
    let (renderer, rendered) = render_thread.join().map_err(|_| DemoError::RenderThreadPanicked)?;
    let stats = renderer.stats().clone();
    let released = renderer.clean_up()?;
    simulated?;
    let rendered = rendered?;

    log::info!(
        "Rendered {} frames: {} meshes, {} sprites, {} backend failures, {} commands recorded",
        rendered,
        stats.mesh_entries_drawn,
        stats.sprite_entries_drawn,
        stats.backend_failures,
        command_log.len()
    );
    if released > 0 {
        log::info!("{released} entries were still queued at shutdown and have been released");
    }

    let report = scene.reference_report()?;
    for (kind, index, count) in &report.counts {
        log::debug!("{kind} {index}: {count} reference(s)");
    }
    if !report.is_balanced() {
        let leaked = report.counts.iter().map(|&(_, _, count)| count - 1).sum();
        return Err(DemoError::LeakedReferences(leaked));
    }
    log::info!("All {} assets are back to a single owner", report.counts.len());

    scene.release()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up panic hook for better error reporting
    std::panic::set_hook(Box::new(|panic_info| {
        let thread = thread::current();
        eprintln!("PANIC on thread '{}': {}", thread.name().unwrap_or("<unnamed>"), panic_info);
    }));

    let config = load_config()?;
    logging::init_with_level(config.pipeline.logging.level_filter());

    log::info!("Starting frame pipeline demo ({} frames)", config.frames);

    let result = std::panic::catch_unwind(move || run(config));

    match result {
        Ok(Ok(())) => {
            log::info!("Frame pipeline demo finished successfully");
            Ok(())
        }
        Ok(Err(e)) => {
            log::error!("Demo failed: {e}");
            Err(e.into())
        }
        Err(panic) => {
            log::error!("Demo panicked: {:?}", panic);
            Err("Demo panicked during execution".into())
        }
    }
}
