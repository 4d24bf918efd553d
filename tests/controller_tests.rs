//! Animation Controller Tests
//!
//! Tests for:
//! - Load/reset lifecycle and the generation counter
//! - play/pause/resume/stop/scrub/set_speed transitions
//! - Per-frame evaluation and the throttled visible playhead
//! - Snapshots

mod common;

use glam::Vec3;
use stagehand::animation::AnimationClip;
use stagehand::scene::Scene;
use stagehand::{
    AnimationController, AnimationStatus, ClipId, ClipRegistry, Error, NodeHandle,
    PlaybackSettings,
};

use common::{approx, arm_clip, rig_scene, set_rest_position, translation_clip};

// ============================================================================
// Helpers
// ============================================================================

/// A rigged scene and a controller playing `clips` on it.
fn setup(clips: &[(&str, f32)]) -> (Scene, NodeHandle, AnimationController) {
    setup_with(PlaybackSettings::default(), clips)
}

fn setup_with(
    settings: PlaybackSettings,
    clips: &[(&str, f32)],
) -> (Scene, NodeHandle, AnimationController) {
    let (scene, root) = rig_scene(Vec3::ZERO, Vec3::ONE);
    let mut controller = AnimationController::new(settings);
    let registry = ClipRegistry::bind(
        &scene,
        root,
        clips.iter().map(|(name, duration)| arm_clip(name, *duration)),
    );
    controller.load(root, registry);
    (scene, root, controller)
}

fn action_time(controller: &AnimationController, id: usize) -> f32 {
    controller.registry().unwrap().action(ClipId(id)).unwrap().time
}

fn is_running(controller: &AnimationController, id: usize) -> bool {
    controller.registry().unwrap().action(ClipId(id)).unwrap().is_running()
}

fn arm_y(scene: &Scene, root: NodeHandle) -> f32 {
    let arm = scene.find_node_by_name(root, "Arm").unwrap();
    scene.get_node(arm).unwrap().transform.position.y
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn new_controller_is_idle() {
    let controller = AnimationController::default();
    assert_eq!(controller.status(), AnimationStatus::Idle);
    assert_eq!(controller.generation(), 0);
    assert!(controller.root().is_none());
    assert!(controller.clips().is_empty());
}

#[test]
fn load_without_clips_is_idle() {
    let (_, root, controller) = setup(&[]);

    assert_eq!(controller.status(), AnimationStatus::Idle);
    assert_eq!(controller.state().current_clip, None);
    assert_eq!(controller.root(), Some(root));
}

#[test]
fn load_with_clips_autoplays_first() {
    let (_, _, controller) = setup(&[("Walk", 1.0), ("Run", 0.5)]);

    let state = controller.state();
    assert_eq!(state.status, AnimationStatus::Playing);
    assert_eq!(state.current_clip, Some(ClipId(0)));
    assert_eq!(state.time, 0.0);
    assert!(is_running(&controller, 0));
    assert!(!is_running(&controller, 1));
}

#[test]
fn load_without_autoplay_waits_ready() {
    let settings = PlaybackSettings {
        autoplay: false,
        ..Default::default()
    };
    let (_, _, mut controller) = setup_with(settings, &[("Walk", 1.0)]);

    assert_eq!(controller.status(), AnimationStatus::Ready);
    assert_eq!(controller.state().current_clip, Some(ClipId(0)));
    assert!(!is_running(&controller, 0));

    controller.resume();
    assert_eq!(controller.status(), AnimationStatus::Playing);
    assert!(is_running(&controller, 0));
}

#[test]
fn load_bumps_generation_and_resets_state() {
    let (scene, root, mut controller) = setup(&[("Walk", 1.0)]);
    assert_eq!(controller.generation(), 1);

    controller.set_speed(3.0).unwrap();
    controller.pause();

    let registry = ClipRegistry::bind(&scene, root, [arm_clip("Jump", 2.0)]);
    controller.load(root, registry);

    assert_eq!(controller.generation(), 2);
    assert_eq!(controller.status(), AnimationStatus::Playing);
    assert_eq!(controller.state().speed, 1.0);
    assert_eq!(controller.current_clip().unwrap().name, "Jump");
}

#[test]
fn reset_returns_to_idle_and_forgets_model() {
    let (_, _, mut controller) = setup(&[("Walk", 1.0)]);

    controller.reset();

    assert_eq!(controller.status(), AnimationStatus::Idle);
    assert_eq!(controller.generation(), 2);
    assert!(controller.root().is_none());
    assert!(controller.registry().is_none());
}

// ============================================================================
// Play
// ============================================================================

#[test]
fn play_switch_leaves_single_running_clip() {
    let (mut scene, _, mut controller) = setup(&[("A", 1.0), ("B", 1.0), ("C", 1.0)]);

    controller.play(Some(ClipId(0))).unwrap();
    controller.update(0.3, &mut scene);
    controller.play(Some(ClipId(1))).unwrap();

    assert!(is_running(&controller, 1));
    let registry = controller.registry().unwrap();
    for id in [0, 2] {
        let action = registry.action(ClipId(id)).unwrap();
        assert!(!action.enabled, "clip {id} still enabled");
        assert_eq!(action.time, 0.0);
    }
    assert_eq!(controller.state().current_clip, Some(ClipId(1)));
}

#[test]
fn play_restarts_from_zero() {
    let (mut scene, _, mut controller) = setup(&[("Walk", 2.0)]);
    controller.update(1.0, &mut scene);

    controller.play(None).unwrap();

    assert_eq!(action_time(&controller, 0), 0.0);
    assert_eq!(controller.state().time, 0.0);
}

#[test]
fn play_unknown_clip_changes_nothing() {
    let (_, _, mut controller) = setup(&[("Walk", 1.0)]);
    controller.pause();
    let before = controller.state().clone();

    let err = controller.play(Some(ClipId(7))).unwrap_err();
    assert!(matches!(err, Error::ClipNotFound(_)));

    let err = controller.play_by_name(Some("Moonwalk")).unwrap_err();
    assert!(matches!(err, Error::ClipNotFound(ref name) if name == "Moonwalk"));

    assert_eq!(controller.state(), &before);
}

#[test]
fn play_without_model_is_rejected() {
    let mut controller = AnimationController::default();
    assert!(matches!(controller.play(None), Err(Error::NoModelLoaded)));
    assert!(matches!(controller.play_by_name(Some("Walk")), Err(Error::NoModelLoaded)));
    assert_eq!(controller.status(), AnimationStatus::Idle);
}

#[test]
fn play_by_name_selects_clip() {
    let (_, _, mut controller) = setup(&[("Walk", 1.0), ("Run", 0.5)]);

    controller.play_by_name(Some("Run")).unwrap();

    assert_eq!(controller.current_clip().unwrap().name, "Run");
    assert!(is_running(&controller, 1));
    assert!(!is_running(&controller, 0));
}

// ============================================================================
// Pause / Resume / Stop
// ============================================================================

#[test]
fn pause_freezes_playhead() {
    let (mut scene, _, mut controller) = setup(&[("Walk", 2.0)]);
    controller.update(0.5, &mut scene);

    controller.pause();
    controller.update(1.0, &mut scene);

    assert_eq!(controller.status(), AnimationStatus::Paused);
    assert!(approx(action_time(&controller, 0), 0.5));
    assert!(approx(controller.state().time, 0.5));
}

#[test]
fn resume_continues_from_paused_time() {
    let (mut scene, _, mut controller) = setup(&[("Walk", 2.0)]);
    controller.update(0.5, &mut scene);
    controller.pause();

    controller.resume();
    controller.update(0.25, &mut scene);

    assert_eq!(controller.status(), AnimationStatus::Playing);
    assert!(approx(action_time(&controller, 0), 0.75));
}

#[test]
fn pause_and_resume_without_selection_are_noops() {
    let (_, _, mut controller) = setup(&[]);

    controller.pause();
    assert_eq!(controller.status(), AnimationStatus::Idle);
    controller.resume();
    assert_eq!(controller.status(), AnimationStatus::Idle);
}

#[test]
fn pause_only_applies_while_playing() {
    let (_, _, mut controller) = setup(&[("Walk", 1.0)]);
    controller.stop();

    controller.pause();

    assert_eq!(controller.status(), AnimationStatus::Stopped);
}

#[test]
fn stop_rewinds_and_disables() {
    let (mut scene, _, mut controller) = setup(&[("Walk", 2.0)]);
    controller.update(1.5, &mut scene);

    controller.stop();

    assert_eq!(controller.status(), AnimationStatus::Stopped);
    assert_eq!(controller.state().time, 0.0);
    assert_eq!(action_time(&controller, 0), 0.0);
    assert!(!is_running(&controller, 0));

    // A stopped clip does not advance.
    controller.update(0.5, &mut scene);
    assert_eq!(action_time(&controller, 0), 0.0);
}

#[test]
fn resume_after_stop_restarts() {
    let (mut scene, _, mut controller) = setup(&[("Walk", 2.0)]);
    controller.stop();

    controller.resume();
    controller.update(0.5, &mut scene);

    assert_eq!(controller.status(), AnimationStatus::Playing);
    assert!(approx(action_time(&controller, 0), 0.5));
}

/// A rig whose `Arm` rests at y = 3, with `clips` bound and the first one playing.
fn setup_at_rest(clips: Vec<AnimationClip>) -> (Scene, NodeHandle, AnimationController) {
    let (mut scene, root) = rig_scene(Vec3::ZERO, Vec3::ONE);
    set_rest_position(&mut scene, root, "Arm", Vec3::new(0.0, 3.0, 0.0));
    let mut controller = AnimationController::default();
    controller.load(root, ClipRegistry::bind(&scene, root, clips));
    (scene, root, controller)
}

#[test]
fn stop_returns_model_to_rest_pose() {
    let (mut scene, root, mut controller) = setup_at_rest(vec![arm_clip("Walk", 2.0)]);
    controller.update(1.0, &mut scene);
    assert!(approx(arm_y(&scene, root), 0.5));

    controller.stop();
    controller.update(0.016, &mut scene);

    assert_eq!(controller.status(), AnimationStatus::Stopped);
    assert!(approx(arm_y(&scene, root), 3.0), "arm_y {}", arm_y(&scene, root));
}

#[test]
fn paused_clip_holds_its_pose() {
    let (mut scene, root, mut controller) = setup_at_rest(vec![arm_clip("Walk", 2.0)]);
    controller.update(1.0, &mut scene);

    controller.pause();
    controller.update(0.5, &mut scene);

    assert!(approx(arm_y(&scene, root), 0.5));
}

#[test]
fn switching_clips_releases_nodes_the_new_clip_does_not_animate() {
    let (mut scene, root, mut controller) = setup_at_rest(vec![
        arm_clip("Wave", 2.0),
        translation_clip("Sway", "Body", 2.0),
    ]);
    controller.update(1.0, &mut scene);
    assert!(approx(arm_y(&scene, root), 0.5));

    controller.play(Some(ClipId(1))).unwrap();
    controller.update(1.0, &mut scene);

    assert!(approx(arm_y(&scene, root), 3.0));
    let body = scene.find_node_by_name(root, "Body").unwrap();
    assert!(approx(scene.get_node(body).unwrap().transform.position.y, 0.5));
}

// ============================================================================
// Scrub
// ============================================================================

#[test]
fn scrub_preserves_playing() {
    let (mut scene, _, mut controller) = setup(&[("Walk", 2.0)]);

    controller.scrub(1.2);
    assert_eq!(controller.status(), AnimationStatus::Playing);
    assert!(approx(controller.state().time, 1.2));
    assert!(is_running(&controller, 0));

    // Still advancing after the scrub.
    controller.update(0.3, &mut scene);
    assert!(approx(action_time(&controller, 0), 1.5));
}

#[test]
fn scrub_preserves_paused() {
    let (mut scene, root, mut controller) = setup(&[("Walk", 2.0)]);
    controller.pause();

    controller.scrub(1.0);
    controller.update(0.5, &mut scene);

    assert_eq!(controller.status(), AnimationStatus::Paused);
    assert!(approx(controller.state().time, 1.0));
    assert!(approx(action_time(&controller, 0), 1.0));
    // The paused pose follows the scrubbed playhead.
    assert!(approx(arm_y(&scene, root), 0.5));
}

#[test]
fn scrub_clamps_to_clip_duration() {
    let (_, _, mut controller) = setup(&[("Walk", 2.0)]);

    for (requested, expected) in [(5.0, 2.0), (-1.0, 0.0), (0.75, 0.75), (f32::NAN, 0.0)] {
        controller.scrub(requested);
        assert!(
            approx(controller.state().time, expected),
            "scrub({requested}) gave {}",
            controller.state().time
        );
        assert_eq!(controller.state().time, action_time(&controller, 0));
    }
}

#[test]
fn scrub_is_ignored_while_stopped() {
    let (mut scene, _, mut controller) = setup(&[("Walk", 2.0)]);
    controller.stop();

    controller.scrub(1.5);
    assert_eq!(controller.state().time, 0.0);
    assert_eq!(action_time(&controller, 0), 0.0);

    controller.resume();
    controller.update(0.5, &mut scene);
    assert!(approx(action_time(&controller, 0), 0.5));
}

// ============================================================================
// Speed
// ============================================================================

#[test]
fn set_speed_scales_advancement() {
    let (mut scene, _, mut controller) = setup(&[("Walk", 4.0)]);

    controller.set_speed(2.0).unwrap();
    controller.update(0.5, &mut scene);

    assert!(approx(action_time(&controller, 0), 1.0));
}

#[test]
fn set_speed_persists_for_later_clips() {
    let (mut scene, _, mut controller) = setup(&[("Walk", 4.0), ("Run", 4.0)]);

    controller.set_speed(0.5).unwrap();
    controller.play(Some(ClipId(1))).unwrap();
    controller.update(1.0, &mut scene);

    assert!(approx(action_time(&controller, 1), 0.5));
    assert_eq!(controller.snapshot().speed, 0.5);
}

#[test]
fn set_speed_rejects_invalid_rates() {
    let (_, _, mut controller) = setup(&[("Walk", 1.0)]);

    for rate in [0.0, -1.0, f32::NAN, f32::INFINITY] {
        let err = controller.set_speed(rate).unwrap_err();
        assert!(matches!(err, Error::InvalidPlaybackSpeed(_)), "rate {rate}");
    }
    assert_eq!(controller.state().speed, 1.0);
}

// ============================================================================
// Frame Update
// ============================================================================

#[test]
fn looping_clip_reaches_end_and_keeps_playing() {
    let (mut scene, _, mut controller) = setup(&[("Wave", 2.0)]);
    controller.play(Some(ClipId(0))).unwrap();

    for _ in 0..4 {
        controller.update(0.5, &mut scene);
    }
    assert!(approx(controller.state().time, 2.0), "time {}", controller.state().time);
    assert_eq!(controller.status(), AnimationStatus::Playing);

    controller.update(0.5, &mut scene);
    assert!(approx(controller.state().time, 0.5), "time {}", controller.state().time);
    assert_eq!(controller.status(), AnimationStatus::Playing);
}

#[test]
fn update_poses_the_scene() {
    let (mut scene, root, mut controller) = setup(&[("Wave", 2.0)]);

    controller.update(1.0, &mut scene);

    assert!(approx(arm_y(&scene, root), 0.5));
}

#[test]
fn update_ignores_invalid_deltas() {
    let (mut scene, _, mut controller) = setup(&[("Wave", 2.0)]);

    controller.update(-1.0, &mut scene);
    controller.update(f32::NAN, &mut scene);
    controller.update(f32::INFINITY, &mut scene);

    assert_eq!(action_time(&controller, 0), 0.0);
    assert_eq!(controller.status(), AnimationStatus::Playing);
}

#[test]
fn visible_time_is_throttled_but_evaluation_is_not() {
    let (mut scene, _, mut controller) = setup(&[("Wave", 2.0)]);
    let dt = 1.0 / 240.0;

    // First frame publishes the load; the playhead sample is not due yet.
    assert!(controller.update(dt, &mut scene));
    assert_eq!(controller.state().time, 0.0);
    assert!(approx(action_time(&controller, 0), dt));

    // The evaluator advanced every frame regardless.
    for _ in 0..3 {
        controller.update(dt, &mut scene);
    }
    assert!(approx(action_time(&controller, 0), 4.0 * dt));
}

#[test]
fn snapshot_cadence_is_frame_rate_independent() {
    for fps in [60.0_f32, 144.0, 240.0] {
        let (mut scene, _, mut controller) = setup(&[("Wave", 10.0)]);
        let dt = 1.0 / fps;

        // Drain the load notification.
        controller.update(0.0, &mut scene);

        let published = (0..fps as usize * 2)
            .filter(|_| controller.update(dt, &mut scene))
            .count();
        assert!(published.abs_diff(60) <= 2, "fps {fps}: {published} snapshots");
    }
}

#[test]
fn commands_publish_on_next_update() {
    let (mut scene, _, mut controller) = setup(&[("Wave", 2.0)]);
    controller.update(0.0, &mut scene);
    assert!(!controller.update(0.0, &mut scene));

    controller.pause();

    assert!(controller.update(0.0, &mut scene));
    assert!(!controller.update(0.0, &mut scene));
}

// ============================================================================
// Snapshot
// ============================================================================

#[test]
fn snapshot_reflects_state() {
    let (mut scene, _, mut controller) = setup(&[("Walk", 2.0), ("Run", 0.5)]);
    controller.set_speed(1.5).unwrap();
    controller.scrub(1.0);
    controller.update(0.0, &mut scene);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.clip_names, ["Walk", "Run"]);
    assert_eq!(snapshot.current_clip.as_deref(), Some("Walk"));
    assert_eq!(snapshot.status, AnimationStatus::Playing);
    assert!(approx(snapshot.time, 1.0));
    assert!(approx(snapshot.duration, 2.0));
    assert!(approx(snapshot.progress(), 0.5));
    assert_eq!(snapshot.speed, 1.5);
    assert_eq!(snapshot.generation, 1);
}

#[test]
fn snapshot_without_model_is_empty() {
    let snapshot = AnimationController::default().snapshot();
    assert!(snapshot.clip_names.is_empty());
    assert_eq!(snapshot.current_clip, None);
    assert_eq!(snapshot.duration, 0.0);
    assert_eq!(snapshot.progress(), 0.0);
}
