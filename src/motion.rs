//! Shared kinematics: velocity/heading components and the angle math used by
//! every steering consumer.
//!
//! The world is a flat, unbounded 2D plane with Newtonian drift.  A heading of
//! 0 points along +X and increases counter-clockwise; direction vectors are
//! `(cos θ, sin θ)`.  Positions live in `Transform.translation`, so the
//! renderer reads them without any extra sync step.

use bevy::prelude::*;

/// Linear velocity in world units per tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity(pub Vec2);

/// Facing angle in radians; `Transform.rotation` is derived from this.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Heading(pub f32);

/// Set while the entity applied thrust this tick (renderer hook for engine
/// flare effects).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Thrusting(pub bool);

impl Heading {
    /// Unit direction vector for the current angle.
    #[inline]
    pub fn dir(&self) -> Vec2 {
        Vec2::new(self.0.cos(), self.0.sin())
    }
}

/// Normalize an angle into (−π, π].
///
/// Steering compares a desired angle against the current heading; without
/// normalization a ship facing 3.1 rad told to face −3.1 rad would turn the
/// long way around.
#[inline]
pub fn wrap_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Clamp a velocity to a maximum speed, preserving direction.
#[inline]
pub fn clamp_speed(vel: Vec2, max_speed: f32) -> Vec2 {
    let speed = vel.length();
    if speed > max_speed && speed > 0.0 {
        vel * (max_speed / speed)
    } else {
        vel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn wrap_angle_keeps_range_half_open() {
        assert!((wrap_angle(PI) - PI).abs() < 1e-6, "π stays π");
        assert!((wrap_angle(-PI) - PI).abs() < 1e-6, "−π maps to π");
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!(wrap_angle(0.5).abs() - 0.5 < 1e-6);
    }

    #[test]
    fn wrap_angle_picks_short_way_round() {
        let diff = wrap_angle(3.1 - (-3.1));
        assert!(diff < 0.0, "crossing ±π must produce a small negative turn");
        assert!(diff.abs() < 0.2);
    }

    #[test]
    fn clamp_speed_preserves_direction() {
        let v = clamp_speed(Vec2::new(3.0, 4.0), 1.0);
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!((v.x / v.y - 0.75).abs() < 1e-6);
    }

    #[test]
    fn clamp_speed_leaves_slow_velocities_alone() {
        let v = Vec2::new(0.1, 0.2);
        assert_eq!(clamp_speed(v, 1.0), v);
    }
}
