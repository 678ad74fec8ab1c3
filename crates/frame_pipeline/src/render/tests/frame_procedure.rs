//! Render procedure tests: draw order, clear state and entry release
//!
//! Every test here submits and renders on one thread; the gate only needs
//! the two signals in the right order, not two threads.

use std::f32::consts::PI;
use std::sync::Arc;

use approx::assert_relative_eq;

use super::{mesh, opaque_effect, open_window, pipeline, pipeline_with, sprite, texture, transparent_effect};
use crate::core::RenderSystemConfig;
use crate::foundation::math::{Quat, Vec3};
use crate::render::{
    backend::BackendOperation,
    recording_backend::{DrawCommand, RecordingBackend},
    Camera, Color, FrameOutcome, FrameReport,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(outcome: FrameOutcome) -> FrameReport {
        match outcome {
            FrameOutcome::Rendered(report) => report,
            FrameOutcome::NoSubmission => panic!("expected a rendered frame"),
        }
    }

    #[test]
    fn test_end_to_end_draw_sequence() {
        let (mut system, mut submitter, log) = pipeline();
        let (m1, m2, s1) = (mesh("M1"), mesh("M2"), sprite("S1"));
        let (opaque, blended, tex) = (opaque_effect(), transparent_effect(), texture("checker"));

        open_window(&mut submitter);
        submitter.submit_camera(&Camera::default(), Vec3::zeros(), Quat::identity());
        submitter.submit_mesh(&m1, &opaque, &tex, Vec3::new(0.0, 0.0, 5.0), Quat::identity());
        submitter.submit_mesh(&m2, &blended, &tex, Vec3::new(0.0, 0.0, 2.0), Quat::identity());
        submitter.submit_sprite(&s1, &opaque, &tex);
        assert_eq!(Arc::strong_count(&m1), 2);
        assert_eq!(Arc::strong_count(&tex), 4);
        submitter.signal_submission_complete().unwrap();

        let report = rendered(system.render_frame().unwrap());
        assert_eq!(report.mesh_entries, 2);
        assert_eq!(report.transparent_entries, 1);
        assert_eq!(report.sprite_entries, 1);
        assert_eq!(report.draw_calls, 3);
        assert_eq!(report.entries_released, 3);
        assert!(report.is_clean());

        let commands = log.take();
        assert_eq!(commands[0], DrawCommand::ClearColor(Color::BLACK));
        assert_eq!(commands[1], DrawCommand::ClearDepth(1.0));
        assert!(matches!(commands[2], DrawCommand::UploadPerFrameConstants(_)));
        assert_eq!(commands.last(), Some(&DrawCommand::Present));

        let drawn: Vec<&str> = commands.iter().filter_map(DrawCommand::drawn_name).collect();
        assert_eq!(drawn, vec!["M1", "M2", "S1"]);

        for handle in [Arc::strong_count(&m1), Arc::strong_count(&m2), Arc::strong_count(&s1)] {
            assert_eq!(handle, 1);
        }
        assert_eq!(Arc::strong_count(&opaque), 1);
        assert_eq!(Arc::strong_count(&blended), 1);
        assert_eq!(Arc::strong_count(&tex), 1);
    }

    #[test]
    fn test_mesh_draw_binds_before_drawing() {
        let (mut system, mut submitter, log) = pipeline();
        let position = Vec3::new(1.0, 2.0, 3.0);

        open_window(&mut submitter);
        submitter.submit_mesh(&mesh("M"), &opaque_effect(), &texture("T"), position, Quat::identity());
        submitter.signal_submission_complete().unwrap();
        system.render_frame().unwrap();

        let commands = log.take();
        let DrawCommand::UploadPerDrawCallConstants(constants) = &commands[3] else {
            panic!("expected per-draw constants, got {:?}", commands[3]);
        };
        assert_relative_eq!(constants.local_to_world[3][0], 1.0);
        assert_relative_eq!(constants.local_to_world[3][1], 2.0);
        assert_relative_eq!(constants.local_to_world[3][2], 3.0);
        assert_eq!(
            &commands[4..7],
            &[
                DrawCommand::BindEffect("opaque".into()),
                DrawCommand::BindTexture { texture: "T".into(), slot: 0 },
                DrawCommand::DrawMesh("M".into()),
            ]
        );
    }

    #[test]
    fn test_texture_slot_comes_from_config() {
        let config = RenderSystemConfig {
            texture_slot: 3,
            ..RenderSystemConfig::default()
        };
        let (mut system, mut submitter, log) = pipeline_with(config, RecordingBackend::new());

        open_window(&mut submitter);
        submitter.submit_sprite(&sprite("S"), &opaque_effect(), &texture("T"));
        submitter.signal_submission_complete().unwrap();
        system.render_frame().unwrap();

        assert!(log
            .snapshot()
            .contains(&DrawCommand::BindTexture { texture: "T".into(), slot: 3 }));
    }

    #[test]
    fn test_transparent_pass_is_farthest_first_and_stable() {
        let (mut system, mut submitter, log) = pipeline();
        let (blended, tex) = (transparent_effect(), texture("glass"));

        open_window(&mut submitter);
        // Camera 10 units behind the origin; depth is z + 10
        submitter.submit_camera(&Camera::default(), Vec3::new(0.0, 0.0, -10.0), Quat::identity());
        for (name, z) in [("T0", 3.0), ("T1", 9.0), ("T2", 6.0), ("T3", 9.0)] {
            submitter.submit_mesh(&mesh(name), &blended, &tex, Vec3::new(0.0, 0.0, z), Quat::identity());
        }
        submitter.signal_submission_complete().unwrap();
        system.render_frame().unwrap();

        assert_eq!(log.drawn_names(), vec!["T1", "T3", "T2", "T0"]);
    }

    #[test]
    fn test_transparent_depth_follows_camera_orientation() {
        let (mut system, mut submitter, log) = pipeline();
        let (blended, tex) = (transparent_effect(), texture("glass"));

        open_window(&mut submitter);
        // Turned around to look down -Z, so the most negative world z is farthest
        let turned = Quat::from_axis_angle(&Vec3::y_axis(), PI);
        submitter.submit_camera(&Camera::default(), Vec3::zeros(), turned);
        for (name, z) in [("T0", 3.0), ("T1", 9.0), ("T2", 6.0)] {
            submitter.submit_mesh(&mesh(name), &blended, &tex, Vec3::new(0.0, 0.0, -z), Quat::identity());
        }
        submitter.signal_submission_complete().unwrap();
        system.render_frame().unwrap();

        assert_eq!(log.drawn_names(), vec!["T1", "T2", "T0"]);
    }

    #[test]
    fn test_opaque_keeps_submission_order_and_precedes_transparent() {
        let (mut system, mut submitter, log) = pipeline();
        let (opaque, blended, tex) = (opaque_effect(), transparent_effect(), texture("t"));

        open_window(&mut submitter);
        submitter.submit_mesh(&mesh("glass"), &blended, &tex, Vec3::new(0.0, 0.0, 50.0), Quat::identity());
        submitter.submit_mesh(&mesh("near"), &opaque, &tex, Vec3::new(0.0, 0.0, 1.0), Quat::identity());
        submitter.submit_mesh(&mesh("far"), &opaque, &tex, Vec3::new(0.0, 0.0, 90.0), Quat::identity());
        submitter.submit_sprite(&sprite("hud"), &blended, &tex);
        submitter.signal_submission_complete().unwrap();
        system.render_frame().unwrap();

        assert_eq!(log.drawn_names(), vec!["near", "far", "glass", "hud"]);
    }

    #[test]
    fn test_last_background_color_wins() {
        let (mut system, mut submitter, log) = pipeline();

        open_window(&mut submitter);
        submitter.submit_background_color(Color::RED);
        submitter.submit_background_color(Color::TURQUOISE);
        submitter.submit_depth_clear(0.25);
        submitter.submit_elapsed_time(4.0, 2.0);
        submitter.signal_submission_complete().unwrap();
        system.render_frame().unwrap();

        let commands = log.take();
        assert_eq!(commands[0], DrawCommand::ClearColor(Color::TURQUOISE));
        assert_eq!(commands[1], DrawCommand::ClearDepth(0.25));
        let DrawCommand::UploadPerFrameConstants(constants) = &commands[2] else {
            panic!("expected per-frame constants, got {:?}", commands[2]);
        };
        assert_relative_eq!(constants.elapsed_seconds_system, 4.0);
        assert_relative_eq!(constants.elapsed_seconds_simulation, 2.0);
    }

    #[test]
    fn test_backend_failure_still_presents_and_releases() {
        let (backend, log) = RecordingBackend::new();
        let backend = (backend.fail_on(BackendOperation::DrawMesh), log);
        let (mut system, mut submitter, log) = pipeline_with(RenderSystemConfig::default(), backend);
        let (m, s, fx, tex) = (mesh("M"), sprite("S"), opaque_effect(), texture("T"));

        for _ in 0..2 {
            open_window(&mut submitter);
            submitter.submit_mesh(&m, &fx, &tex, Vec3::zeros(), Quat::identity());
            submitter.submit_mesh(&m, &fx, &tex, Vec3::zeros(), Quat::identity());
            submitter.submit_sprite(&s, &fx, &tex);
            submitter.signal_submission_complete().unwrap();

            let report = rendered(system.render_frame().unwrap());
            assert_eq!(report.backend_failures.len(), 1);
            assert_eq!(report.draw_calls, 0);
            assert_eq!(report.entries_released, 3);
            assert_eq!(log.take().last(), Some(&DrawCommand::Present));
        }

        assert_eq!(Arc::strong_count(&m), 1);
        assert_eq!(Arc::strong_count(&s), 1);
        assert_eq!(Arc::strong_count(&tex), 1);
        assert_eq!(system.stats().frames_rendered, 2);
        assert_eq!(system.stats().backend_failures, 2);
        assert!(!system.is_halted());
    }

    #[test]
    fn test_present_failure_is_absorbed() {
        let (backend, log) = RecordingBackend::new();
        let backend = (backend.fail_on(BackendOperation::Present), log);
        let (mut system, mut submitter, _log) = pipeline_with(RenderSystemConfig::default(), backend);
        let m = mesh("M");

        open_window(&mut submitter);
        submitter.submit_mesh(&m, &opaque_effect(), &texture("T"), Vec3::zeros(), Quat::identity());
        submitter.signal_submission_complete().unwrap();

        let report = rendered(system.render_frame().unwrap());
        assert_eq!(report.draw_calls, 1);
        assert_eq!(report.backend_failures.len(), 1);
        assert_eq!(Arc::strong_count(&m), 1);
    }

    #[test]
    fn test_clean_up_drains_both_slots() {
        let (system, mut submitter, log) = pipeline();
        let (m, s, fx, tex) = (mesh("M"), sprite("S"), opaque_effect(), texture("T"));

        // One frame handed over but never rendered
        open_window(&mut submitter);
        submitter.submit_mesh(&m, &fx, &tex, Vec3::zeros(), Quat::identity());
        submitter.signal_submission_complete().unwrap();

        assert_eq!(Arc::strong_count(&m), 2);
        assert_eq!(system.clean_up().unwrap(), 1);
        assert_eq!(Arc::strong_count(&m), 1);
        assert_eq!(Arc::strong_count(&s), 1);
        assert_eq!(Arc::strong_count(&tex), 1);
        assert_eq!(log.snapshot(), vec![DrawCommand::CleanUp]);
    }

    #[test]
    fn test_clean_up_releases_frame_being_written() {
        let (mut system, mut submitter, _log) = pipeline();
        let (m, fx, tex) = (mesh("M"), opaque_effect(), texture("T"));

        // Frame 1 is pending in one slot, frame 2 is half written in the other
        open_window(&mut submitter);
        submitter.submit_mesh(&m, &fx, &tex, Vec3::zeros(), Quat::identity());
        submitter.signal_submission_complete().unwrap();
        system.render_frame().unwrap();

        open_window(&mut submitter);
        submitter.submit_mesh(&m, &fx, &tex, Vec3::zeros(), Quat::identity());
        submitter.submit_sprite(&sprite("S"), &fx, &tex);

        assert_eq!(system.clean_up().unwrap(), 2);
        assert_eq!(Arc::strong_count(&m), 1);
        assert_eq!(Arc::strong_count(&tex), 1);
    }
}
