//! Geometry helpers shared by the interaction controls.
//!
//! Provides control-local frame transforms, padded box containment,
//! single-pole exponential damping, and angle normalization.

use glam::{Quat, Vec3};

// ── Pose ───────────────────────────────────────────────────

/// World-space position and orientation of a control or target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Position in meters.
    pub position: Vec3,
    /// Orientation as a unit quaternion.
    pub orientation: Quat,
}

impl Pose {
    /// Identity pose at the world origin.
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at a position with no rotation.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Transform a world-space point into this pose's local frame.
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        self.orientation.inverse() * (world - self.position)
    }

    /// Transform a local-frame point back into world space.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.orientation * local
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ── Box bounds ─────────────────────────────────────────────

/// Axis-aligned local-space bounding volume given by half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxBounds {
    /// Half-extent along each local axis, in meters.
    pub half_extents: Vec3,
}

impl BoxBounds {
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    /// Whether a local-frame point lies inside the volume grown by
    /// `padding` on every side.
    pub fn contains(&self, local: Vec3, padding: f32) -> bool {
        local.x.abs() <= self.half_extents.x + padding
            && local.y.abs() <= self.half_extents.y + padding
            && local.z.abs() <= self.half_extents.z + padding
    }
}

// ── Scalar helpers ─────────────────────────────────────────

/// Single-pole exponential approach of `current` toward `target`.
///
/// `rate` is in 1/seconds; larger settles faster. Framerate-independent:
/// two ticks of `dt` land where one tick of `2*dt` would. A non-positive
/// `dt` returns `current` unchanged.
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    current + (target - current) * (1.0 - (-rate * dt).exp())
}

/// Map an angle in radians into `(-PI, PI]`.
///
/// Used for angular deltas so a dial crossing the ±PI seam accumulates
/// the short way around instead of jumping by a full turn.
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

// ── Tests ──────────────────────────────────────────────────
