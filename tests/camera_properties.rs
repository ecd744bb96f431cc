use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Mat4;
use spinview::{
    Camera, CameraError, PITCH_LIMIT, Vec3, WORLD_UP, angles_from_direction, direction_from_angles,
};

fn assert_in_range(camera: &Camera) {
    let theta = camera.theta();
    assert!(theta > -PI && theta <= PI, "theta {theta} out of range");
    assert!((camera.direction().length() - 1.0).abs() < 1e-4);
}

fn sample_directions() -> Vec<Vec3> {
    let mut dirs = vec![
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Z,
        Vec3::NEG_Z,
        Vec3::new(1.0, 0.0, -1.0),
        Vec3::new(-1.0, 0.5, -1.0),
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(0.3, -0.8, -0.2),
    ];
    for i in 0..24 {
        let theta = -PI + (i as f32 + 0.5) * TAU / 24.0;
        for phi in [-1.2_f32, -0.4, 0.0, 0.7, 1.3] {
            dirs.push(Vec3::new(theta.cos() * phi.cos(), phi.sin(), theta.sin() * phi.cos()));
        }
    }
    dirs.into_iter().map(Vec3::normalize).collect()
}

#[test]
fn direction_angle_round_trip() {
    for dir in sample_directions() {
        let (theta, phi) = angles_from_direction(dir);
        let back = direction_from_angles(theta, phi);
        assert!(back.abs_diff_eq(dir, 1e-4), "{dir} -> ({theta}, {phi}) -> {back}");
    }
}

#[test]
fn negative_z_keeps_its_hemisphere() {
    let (theta, _) = angles_from_direction(Vec3::new(1.0, 0.0, -1.0).normalize());
    assert!((theta + PI / 4.0).abs() < 1e-5);

    let (theta, _) = angles_from_direction(Vec3::NEG_Z);
    assert!((theta + FRAC_PI_2).abs() < 1e-5);
}

#[test]
fn default_camera_looks_at_origin() {
    let camera = Camera::default();

    assert_eq!(camera.position(), Vec3::ONE);
    assert!(
        camera
            .direction()
            .abs_diff_eq(Vec3::splat(-0.577_350_3), 1e-3)
    );
    let expected = Mat4::look_at_rh(Vec3::ONE, Vec3::ZERO, WORLD_UP);
    assert!(camera.view().abs_diff_eq(expected, 1e-5));
}

#[test]
fn quarter_yaw_from_x_faces_z() {
    let mut camera = Camera::new(Vec3::ZERO, Vec3::X);
    camera.rotate_yaw(FRAC_PI_2);
    assert!(camera.direction().abs_diff_eq(Vec3::Z, 1e-5));
}

#[test]
fn yaw_ticks_past_full_turn_stay_bounded() {
    let mut camera = Camera::default();
    let step = 0.037;
    let steps = (3.0 * TAU / step) as usize;

    for _ in 0..steps {
        camera.rotate_yaw(step);
        assert_in_range(&camera);
    }
    for _ in 0..steps {
        camera.rotate_yaw(-step);
        assert_in_range(&camera);
    }
}

#[test]
fn large_yaw_steps_stay_bounded() {
    let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_X);
    for step in [6.0, -6.2, 3.2, -3.2, 5.5, 6.28] {
        camera.rotate_yaw(step);
        assert_in_range(&camera);
    }
}

#[test]
fn set_position_preserves_direction() {
    let mut camera = Camera::looking_at(Vec3::new(2.0, 0.5, 3.0), Vec3::ZERO).unwrap();
    camera.rotate_yaw(0.3);
    let direction = camera.direction();

    let p = Vec3::new(-4.0, 1.0, 7.5);
    camera.set_position(p);

    assert_eq!(camera.direction(), direction);
    assert_eq!(camera.position(), p);
    let expected = Mat4::look_at_rh(p, p + direction, WORLD_UP);
    assert!(camera.view().abs_diff_eq(expected, 1e-5));
}

#[test]
fn look_at_own_position_changes_nothing() {
    let mut camera = Camera::looking_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO).unwrap();
    let before = camera.clone();

    let err = camera.look_at(camera.position()).unwrap_err();

    assert_eq!(err, CameraError::TargetAtPosition(Vec3::new(1.0, 2.0, 3.0)));
    assert_eq!(camera, before);
}

#[test]
fn look_at_straight_down_is_rejected() {
    let mut camera = Camera::new(Vec3::new(0.0, 5.0, 0.0), Vec3::X);
    let before = camera.clone();

    assert!(matches!(
        camera.look_at(Vec3::ZERO),
        Err(CameraError::DirectionAlongUp(_))
    ));
    assert_eq!(camera, before);
}

#[test]
fn pitch_stops_short_of_the_pole() {
    let mut camera = Camera::new(Vec3::ZERO, Vec3::Z);
    for _ in 0..40 {
        camera.rotate_pitch(0.1);
    }
    assert!((camera.phi() - PITCH_LIMIT).abs() < 1e-5);
    assert!(camera.view().is_finite());

    for _ in 0..80 {
        camera.rotate_pitch(-0.1);
    }
    assert!((camera.phi() + PITCH_LIMIT).abs() < 1e-5);
    assert!(camera.view().is_finite());
}

#[test]
fn view_tracks_every_mutation() {
    let mut camera = Camera::default();
    let check = |camera: &Camera| {
        let expected = Mat4::look_at_rh(
            camera.position(),
            camera.position() + camera.direction(),
            WORLD_UP,
        );
        assert!(camera.view().abs_diff_eq(expected, 1e-5));
    };

    camera.rotate_yaw(1.0);
    check(&camera);
    camera.rotate_pitch(0.4);
    check(&camera);
    camera.set_position(Vec3::new(0.0, 3.0, -2.0));
    check(&camera);
    camera.look_at(Vec3::new(4.0, 0.0, 0.0)).unwrap();
    check(&camera);
}

#[test]
fn steep_look_at_never_pitches_the_wrong_way() {
    let elevation = FRAC_PI_2 - 0.005;
    let target = Vec3::new(elevation.cos(), elevation.sin(), 0.0);
    let mut camera = Camera::new(Vec3::ZERO, Vec3::X);
    camera.look_at(target).unwrap();

    let phi = camera.phi();
    assert!(phi > PITCH_LIMIT);

    camera.rotate_pitch(0.001);
    assert!(camera.phi() >= phi - 1e-6, "tilting up lowered phi to {}", camera.phi());

    camera.rotate_pitch(0.0);
    assert!((camera.phi() - phi).abs() < 1e-5);

    camera.rotate_pitch(-0.1);
    assert!((camera.phi() - (phi - 0.1)).abs() < 1e-4);

    camera.rotate_pitch(0.5);
    assert!((camera.phi() - PITCH_LIMIT).abs() < 1e-5);
}
