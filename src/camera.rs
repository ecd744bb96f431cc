//! First-person look-at camera driven by spherical angles.
//!
//! [`Camera`] keeps one orientation in two forms: a unit `direction` vector and
//! the spherical pair `(theta, phi)`. Each mutator picks one form as the source
//! of truth and rebuilds the other before returning:
//!
//! - [`Camera::rotate_yaw`] and [`Camera::rotate_pitch`] edit the angles and
//!   rebuild the direction from them.
//! - [`Camera::look_at`] and [`Camera::set_position`] edit the direction (or
//!   keep it) and re-derive the angles.
//!
//! The view matrix is cached and recomputed by every mutator, so
//! [`Camera::view`] is a plain read.
//!
//! # Conventions
//!
//! | Quantity | Meaning                                   | Range         |
//! |----------|-------------------------------------------|---------------|
//! | `theta`  | yaw in the x–z plane, measured from +X    | (−π, π]       |
//! | `phi`    | elevation above the x–z plane             | [−π/2, π/2]   |
//!
//! Positive yaw turns +X toward +Z:
//!
//! ```
//! use spinview::{Camera, Vec3};
//!
//! let mut camera = Camera::new(Vec3::ZERO, Vec3::X);
//! camera.rotate_yaw(std::f32::consts::FRAC_PI_2);
//! assert!(camera.direction().abs_diff_eq(Vec3::Z, 1e-5));
//! ```

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Mat4, Vec3};
use thiserror::Error;

/// Fixed world "up" used to build the view basis.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Largest elevation reachable through [`Camera::rotate_pitch`].
///
/// Kept just inside ±π/2 so the forward axis never lines up with [`WORLD_UP`].
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Allowed drift of `|direction|²` away from 1.
const UNIT_LENGTH_TOLERANCE: f32 = 1e-2;

/// Below this, `|direction × up|²` is treated as zero.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Invalid requests rejected by camera mutators.
///
/// A rejected request leaves the camera exactly as it was.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CameraError {
    /// The look-at target coincides with the camera position.
    #[error("camera cannot look at its own position {0}")]
    TargetAtPosition(Vec3),
    /// The requested forward axis is parallel to the world up axis.
    #[error("look direction {0} is parallel to the world up axis")]
    DirectionAlongUp(Vec3),
}

/// A camera with a position, a unit forward direction and a cached view matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    position: Vec3,
    direction: Vec3,
    theta: f32,
    phi: f32,
    view: Mat4,
}

impl Default for Camera {
    /// A camera at (1, 1, 1) looking at the origin.
    fn default() -> Self {
        Self::new(Vec3::ONE, Vec3::NEG_ONE)
    }
}

impl Camera {
    /// Creates a camera at `position` facing along `direction`.
    ///
    /// `direction` is normalized. A zero or vertical direction falls back to +X
    /// with a warning, since neither defines a view basis.
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        let direction = match direction.try_normalize() {
            Some(dir) if !is_along_up(dir) => dir,
            _ => {
                log::warn!("invalid initial camera direction {direction}, facing +X instead");
                Vec3::X
            }
        };

        let mut camera = Self {
            position,
            direction,
            theta: 0.0,
            phi: 0.0,
            view: Mat4::IDENTITY,
        };
        camera.update_view();
        camera.sync_angles_from_direction();
        camera.debug_check_invariants();
        camera
    }

    /// Creates a camera at `position` looking at `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Result<Self, CameraError> {
        let mut camera = Self::new(position, Vec3::X);
        camera.look_at(target)?;
        Ok(camera)
    }

    /// The cached view matrix (world to eye space).
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit forward direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Yaw angle in radians, in (−π, π].
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Elevation angle in radians, in [−π/2, π/2].
    pub fn phi(&self) -> f32 {
        self.phi
    }

    /// Moves the camera without changing where it faces.
    ///
    /// The look-at point moves along with the camera.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view();
        self.sync_angles_from_direction();
        self.debug_check_invariants();
    }

    /// Turns the camera toward `target`.
    ///
    /// Fails without touching any state if `target` is the camera position or
    /// lies straight above or below it.
    pub fn look_at(&mut self, target: Vec3) -> Result<(), CameraError> {
        let Some(direction) = (target - self.position).try_normalize() else {
            return Err(CameraError::TargetAtPosition(self.position));
        };
        if is_along_up(direction) {
            return Err(CameraError::DirectionAlongUp(direction));
        }

        self.direction = direction;
        self.update_view();
        self.sync_angles_from_direction();
        self.debug_check_invariants();
        Ok(())
    }

    /// Rotates around the world up axis by `radians`.
    ///
    /// Positive values turn +X toward +Z. `|radians|` must be below 2π.
    pub fn rotate_yaw(&mut self, radians: f32) {
        debug_assert!(radians.abs() < TAU, "yaw step {radians} exceeds a full turn");

        self.theta = wrap_theta(self.theta + radians);
        self.sync_direction_from_angles();
        self.update_view();
        self.debug_check_invariants();
    }

    /// Tilts the camera up (positive) or down (negative) by `radians`.
    ///
    /// Elevation is clamped to ±[`PITCH_LIMIT`] rather than wrapped. A camera
    /// already past the limit (from [`Camera::look_at`]) may only tilt back
    /// toward the horizon.
    pub fn rotate_pitch(&mut self, radians: f32) {
        let limit = PITCH_LIMIT.max(self.phi.abs());
        self.phi = (self.phi + radians).clamp(-limit, limit);
        self.sync_direction_from_angles();
        self.update_view();
        self.debug_check_invariants();
    }

    fn update_view(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.position + self.direction, WORLD_UP);
    }

    fn sync_direction_from_angles(&mut self) {
        self.direction = direction_from_angles(self.theta, self.phi);
    }

    fn sync_angles_from_direction(&mut self) {
        (self.theta, self.phi) = angles_from_direction(self.direction);
    }

    #[inline]
    fn debug_check_invariants(&self) {
        let drift = (self.direction.length_squared() - 1.0).abs();
        debug_assert!(
            drift < UNIT_LENGTH_TOLERANCE,
            "camera direction {} is not unit length (|d|^2 - 1 = {drift})",
            self.direction
        );
        debug_assert!(
            self.theta > -PI && self.theta <= PI,
            "theta {} outside (-pi, pi]",
            self.theta
        );
        debug_assert!(
            (-FRAC_PI_2..=FRAC_PI_2).contains(&self.phi),
            "phi {} outside [-pi/2, pi/2]",
            self.phi
        );
        debug_assert!(
            direction_from_angles(self.theta, self.phi).abs_diff_eq(self.direction, 1e-3),
            "angles ({}, {}) out of sync with direction {}",
            self.theta,
            self.phi,
            self.direction
        );
    }
}

/// Converts spherical angles into a unit direction.
///
/// `(cosθ·cosφ, sinφ, sinθ·cosφ)`, renormalized to absorb rounding.
pub fn direction_from_angles(theta: f32, phi: f32) -> Vec3 {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3::new(cos_theta * cos_phi, sin_phi, sin_theta * cos_phi).normalize()
}

/// Recovers `(theta, phi)` from a unit direction.
///
/// Uses `atan2(z, x)` for theta so directions with negative z land in the
/// correct hemisphere. A vertical direction reports `theta == 0`.
pub fn angles_from_direction(direction: Vec3) -> (f32, f32) {
    let phi = direction.y.clamp(-1.0, 1.0).asin();
    let theta = wrap_theta(direction.z.atan2(direction.x));
    (theta, phi)
}

/// Brings an angle into (−π, π] with at most one ±2π correction.
pub fn wrap_theta(theta: f32) -> f32 {
    if theta > PI {
        theta - TAU
    } else if theta <= -PI {
        theta + TAU
    } else {
        theta
    }
}

fn is_along_up(direction: Vec3) -> bool {
    direction.cross(WORLD_UP).length_squared() < PARALLEL_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_at_origin() {
        let camera = Camera::default();
        let expected = Vec3::splat(-1.0 / 3.0_f32.sqrt());

        assert_eq!(camera.position(), Vec3::ONE);
        assert!(camera.direction().abs_diff_eq(expected, 1e-5));
        assert!(
            camera
                .view()
                .abs_diff_eq(Mat4::look_at_rh(Vec3::ONE, Vec3::ZERO, WORLD_UP), 1e-5)
        );
    }

    #[test]
    fn yaw_quarter_turn_faces_positive_z() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::X);
        camera.rotate_yaw(FRAC_PI_2);

        assert!(camera.direction().abs_diff_eq(Vec3::Z, 1e-5));
        assert!((camera.theta() - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn yaw_wraps_past_pi() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_X);
        assert!((camera.theta() - PI).abs() < 1e-5);

        camera.rotate_yaw(0.5);
        assert!((camera.theta() - (0.5 - PI)).abs() < 1e-4);

        camera.rotate_yaw(-1.0);
        assert!((camera.theta() - (PI - 0.5)).abs() < 1e-4);
    }

    #[test]
    fn pitch_clamps_instead_of_wrapping() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::X);

        camera.rotate_pitch(1.0);
        camera.rotate_pitch(1.0);
        assert_eq!(camera.phi(), PITCH_LIMIT);
        assert!(camera.direction().y > 0.99);
        assert!(camera.view().is_finite());

        camera.rotate_pitch(-5.0);
        assert_eq!(camera.phi(), -PITCH_LIMIT);
        assert!(camera.direction().y < -0.99);
    }

    #[test]
    fn pitch_keeps_yaw() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::Z);
        let theta = camera.theta();

        camera.rotate_pitch(0.3);
        assert!((camera.theta() - theta).abs() < 1e-6);
        assert!((camera.phi() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn look_at_self_is_rejected() {
        let mut camera = Camera::default();
        let before = camera.clone();

        let err = camera.look_at(camera.position()).unwrap_err();
        assert_eq!(err, CameraError::TargetAtPosition(Vec3::ONE));
        assert_eq!(camera, before);
    }

    #[test]
    fn look_straight_up_is_rejected() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::X);
        let before = camera.clone();

        let err = camera.look_at(Vec3::new(0.0, 10.0, 0.0)).unwrap_err();
        assert!(matches!(err, CameraError::DirectionAlongUp(_)));
        assert_eq!(camera, before);
    }

    #[test]
    fn negative_z_keeps_its_hemisphere() {
        let dir = Vec3::new(-0.3, 0.2, -0.9).normalize();
        let (theta, phi) = angles_from_direction(dir);

        assert!(theta < 0.0);
        assert!(direction_from_angles(theta, phi).abs_diff_eq(dir, 1e-5));
    }

    #[test]
    fn wrap_theta_maps_minus_pi_to_pi() {
        assert_eq!(wrap_theta(-PI), PI);
        assert_eq!(wrap_theta(PI), PI);
        assert!((wrap_theta(PI + 0.25) - (0.25 - PI)).abs() < 1e-6);
    }

    #[test]
    fn new_falls_back_on_degenerate_direction() {
        assert_eq!(Camera::new(Vec3::ZERO, Vec3::ZERO).direction(), Vec3::X);
        assert_eq!(Camera::new(Vec3::ZERO, Vec3::Y).direction(), Vec3::X);
    }

    #[test]
    fn error_messages_name_the_problem() {
        let msg = CameraError::TargetAtPosition(Vec3::ONE).to_string();
        assert!(msg.contains("own position"));
    }
}
