use alpaca_viewer::animation::{
    ActiveAnimationState, AnimationClip, AnimationSelector, Channel, Interpolation, Keyframes,
};
use cgmath::{Quaternion, Rad, Rotation3, Vector3};

use crate::common::test_utils::linear_clip;

mod common;

const EPS: f32 = 1e-4;

fn translation_x(selector: &AnimationSelector) -> f32 {
    selector.pose()[&0].translation.expect("node 0 is animated").x
}

#[test]
fn should_be_idle_without_clips() {
    let selector = AnimationSelector::new(Vec::new());
    assert_eq!(selector.state(), &ActiveAnimationState::Idle);
    assert!(!selector.has_clips());
    assert_eq!(selector.playing_count(), 0);
    assert!(selector.pose().is_empty());
}

#[test]
fn should_play_the_first_clip_in_load_order() {
    let selector = AnimationSelector::new(vec![linear_clip("Walk", 1.0), linear_clip("Idle", 2.0)]);
    assert_eq!(selector.active_clip(), Some("Walk"));
    assert_eq!(selector.clip_names(), vec!["Walk", "Idle"]);
    assert_eq!(selector.playing_count(), 1);
}

#[test]
fn should_stop_the_old_clip_when_switching() {
    let mut selector =
        AnimationSelector::new(vec![linear_clip("Walk", 1.0), linear_clip("Idle", 2.0)]);
    selector.update(0.5);

    assert!(selector.select_clip("Idle"));

    assert_eq!(selector.state(), &ActiveAnimationState::Playing("Idle".to_string()));
    let walk = selector.action("Walk").expect("Walk exists");
    let idle = selector.action("Idle").expect("Idle exists");
    assert!(!walk.is_playing());
    assert_eq!(walk.time(), 0.0);
    assert!(idle.is_playing());
    assert_eq!(idle.time(), 0.0);
    assert_eq!(selector.playing_count(), 1);
}

#[test]
fn should_restart_a_clip_selected_again() {
    let mut selector = AnimationSelector::new(vec![linear_clip("Walk", 4.0)]);
    selector.update(1.5);
    assert!((translation_x(&selector) - 1.5).abs() < EPS);

    selector.select_clip("Walk");

    assert_eq!(selector.action("Walk").map(|a| a.time()), Some(0.0));
    assert_eq!(selector.playing_count(), 1);
}

#[test]
fn should_ignore_unknown_clip_names() {
    let mut selector =
        AnimationSelector::new(vec![linear_clip("Walk", 1.0), linear_clip("Idle", 2.0)]);
    assert!(!selector.select_clip("Run"));
    assert_eq!(selector.active_clip(), Some("Walk"));
    assert_eq!(selector.playing_count(), 1);
}

#[test]
fn should_never_play_two_clips_over_many_switches() {
    let names = ["Walk", "Idle", "Eat", "Idle", "Walk", "Walk", "Eat"];
    let mut selector = AnimationSelector::new(vec![
        linear_clip("Walk", 1.0),
        linear_clip("Idle", 2.0),
        linear_clip("Eat", 3.0),
    ]);
    for name in names {
        selector.update(0.25);
        selector.select_clip(name);
        assert_eq!(selector.playing_count(), 1);
        assert_eq!(selector.active_clip(), Some(name));
    }
}

#[test]
fn should_interpolate_and_loop() {
    let mut selector = AnimationSelector::new(vec![linear_clip("Walk", 2.0)]);
    assert!(translation_x(&selector).abs() < EPS);

    selector.update(0.5);
    assert!((translation_x(&selector) - 0.5).abs() < EPS);

    selector.update(2.0);
    let time = selector.action("Walk").map(|a| a.time()).unwrap_or_default();
    assert!((time - 0.5).abs() < EPS);
    assert!((translation_x(&selector) - 0.5).abs() < EPS);
}

#[test]
fn should_hold_step_keys_until_the_next_one() {
    let clip = AnimationClip::new(
        "Blink",
        vec![Channel {
            node: 3,
            interpolation: Interpolation::Step,
            timestamps: vec![0.0, 1.0, 2.0],
            keyframes: Keyframes::Scale(vec![
                Vector3::new(1.0, 1.0, 1.0),
                Vector3::new(1.0, 0.1, 1.0),
                Vector3::new(1.0, 1.0, 1.0),
            ]),
        }],
    );
    assert_eq!(clip.duration, 2.0);
    let scale_y = |t: f32| clip.sample(t)[&3].scale.map(|s| s.y).unwrap_or_default();
    assert_eq!(scale_y(0.9), 1.0);
    assert_eq!(scale_y(1.5), 0.1);
    assert_eq!(scale_y(5.0), 1.0);
}

#[test]
fn should_slerp_rotations() {
    let clip = AnimationClip::new(
        "Turn",
        vec![Channel {
            node: 1,
            interpolation: Interpolation::Linear,
            timestamps: vec![0.0, 1.0],
            keyframes: Keyframes::Rotation(vec![
                Quaternion::from_angle_y(Rad(0.0)),
                Quaternion::from_angle_y(Rad(std::f32::consts::FRAC_PI_2)),
            ]),
        }],
    );
    let half = clip.sample(0.5)[&1].rotation.expect("node 1 is rotated");
    let expected = Quaternion::from_angle_y(Rad(std::f32::consts::FRAC_PI_4));
    assert!((half.s - expected.s).abs() < EPS);
    assert!((half.v.y - expected.v.y).abs() < EPS);
}

#[test]
fn should_only_override_animated_components() {
    let clip = linear_clip("Walk", 1.0);
    let pose = clip.sample(0.5);
    let node = pose[&0];
    assert!(node.translation.is_some());
    assert!(node.rotation.is_none());
    assert!(node.scale.is_none());
    assert!(!pose.contains_key(&1));
}
