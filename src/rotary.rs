//! Pinch-driven rotary selector.
//!
//! A [`RotaryDragControl`] lets one pinching hand turn a dial among N
//! discrete options. The raw angle accumulates unbounded through an
//! incremental delta normalized into `(-PI, PI]`, so crossing the seam
//! never jumps a full turn; when no hand grabs, the dial snaps to the
//! nearest detent. The displayed angle is damped independently for a
//! smooth settle after release.

use std::f32::consts::TAU;

use glam::Vec3;
use tracing::debug;

use crate::error::{require_positive, ConfigError};
use crate::gesture::GestureState;
use crate::hand::Hand;
use crate::math::{damp, normalize_angle, Pose};

// ── Config ─────────────────────────────────────────────────

/// Rotary geometry and drag tunables.
#[derive(Debug, Clone)]
pub struct RotaryConfig {
    /// Number of discrete options around the dial.
    pub segments: u32,
    /// Radial grab band around the local Z rotation axis, in meters.
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Allowed offset along the rotation axis, in meters.
    pub height_tolerance: f32,
    /// Damping rate (1/s) of the displayed angle toward the target.
    pub damping_rate: f32,
}

impl Default for RotaryConfig {
    fn default() -> Self {
        Self {
            segments: 6,
            inner_radius: 0.03,
            outer_radius: 0.09,
            height_tolerance: 0.03,
            damping_rate: 15.0,
        }
    }
}

impl RotaryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segments == 0 {
            return Err(ConfigError::ZeroSegments);
        }
        require_positive("outer radius", self.outer_radius)?;
        require_positive("height tolerance", self.height_tolerance)?;
        require_positive("damping rate", self.damping_rate)?;
        if self.inner_radius >= self.outer_radius {
            return Err(ConfigError::RadiusBand {
                inner: self.inner_radius,
                outer: self.outer_radius,
            });
        }
        Ok(())
    }
}

// ── Control ────────────────────────────────────────────────

/// Per-tick result of a rotary update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotaryResult {
    /// Selected option, in `[0, segments)`.
    pub selected_index: usize,
    /// Displayed (damped) dial angle in radians.
    pub angle: f32,
    /// Whether a hand currently turns the dial.
    pub grabbed: bool,
}

/// Wrapped angular selection among N discrete options, turned by a
/// single pinching hand.
pub struct RotaryDragControl {
    config: RotaryConfig,
    pose: Pose,
    raw_angle: f32,
    target_angle: f32,
    current_angle: f32,
    selected_index: usize,
    grabbed_by: Option<Hand>,
    last_grab_angle: f32,
    ready: bool,
    on_selection_change: Option<Box<dyn FnMut(usize)>>,
}

impl RotaryDragControl {
    pub fn new(pose: Pose, config: RotaryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            pose,
            raw_angle: 0.0,
            target_angle: 0.0,
            current_angle: 0.0,
            selected_index: 0,
            grabbed_by: None,
            last_grab_angle: 0.0,
            ready: true,
            on_selection_change: None,
        })
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// Displayed dial angle.
    pub fn angle(&self) -> f32 {
        self.current_angle
    }

    pub fn grabbed_by(&self) -> Option<Hand> {
        self.grabbed_by
    }

    /// Angular spacing between adjacent options.
    pub fn segment_angle(&self) -> f32 {
        TAU / self.config.segments as f32
    }

    /// Gate interactivity; losing readiness drops an active grab.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Callback invoked with the new index on every selection change,
    /// before `update` returns.
    pub fn on_selection_change<F>(&mut self, callback: F)
    where
        F: FnMut(usize) + 'static,
    {
        self.on_selection_change = Some(Box::new(callback));
    }

    /// Advance the dial one tick.
    pub fn update(
        &mut self,
        left: &GestureState,
        right: &GestureState,
        delta: f64,
    ) -> RotaryResult {
        if !self.ready {
            self.release();
        }

        if let Some(hand) = self.grabbed_by {
            let state = match hand {
                Hand::Left => left,
                Hand::Right => right,
            };
            match state.pinch.position.filter(|_| state.pinch.active) {
                Some(point) => {
                    let angle = self.angular_position(point);
                    // Incremental accumulation through the normalized
                    // delta keeps seam crossings continuous.
                    self.raw_angle += normalize_angle(angle - self.last_grab_angle);
                    self.last_grab_angle = angle;
                    self.target_angle = self.raw_angle;
                }
                None => self.release(),
            }
        }

        if self.ready && self.grabbed_by.is_none() {
            self.try_acquire(left, right);
        }

        if self.grabbed_by.is_none() {
            // Detent snap while free.
            let segment = self.segment_angle();
            let snapped = (self.raw_angle / segment).round() * segment;
            self.raw_angle = snapped;
            self.target_angle = snapped;
        }

        let segment = self.segment_angle();
        let n = self.config.segments as i64;
        let index = ((((self.raw_angle / segment).round() as i64) % n + n) % n) as usize;
        if index != self.selected_index {
            self.selected_index = index;
            debug!("rotary selection changed to {}", index);
            if let Some(callback) = self.on_selection_change.as_mut() {
                callback(index);
            }
        }

        self.current_angle = damp(
            self.current_angle,
            self.target_angle,
            self.config.damping_rate,
            delta as f32,
        );

        RotaryResult {
            selected_index: self.selected_index,
            angle: self.current_angle,
            grabbed: self.grabbed_by.is_some(),
        }
    }

    /// Angle of a world point around the local Z axis.
    fn angular_position(&self, world: Vec3) -> f32 {
        let local = self.pose.to_local(world);
        local.y.atan2(local.x)
    }

    /// Whether a world point sits in the radial/height grab band.
    fn in_grab_band(&self, world: Vec3) -> bool {
        let local = self.pose.to_local(world);
        let radial = local.truncate().length();
        radial >= self.config.inner_radius
            && radial <= self.config.outer_radius
            && local.z.abs() <= self.config.height_tolerance
    }

    fn try_acquire(&mut self, left: &GestureState, right: &GestureState) {
        for (hand, state) in [(Hand::Left, left), (Hand::Right, right)] {
            let Some(point) = state.pinch.position.filter(|_| state.pinch.active) else {
                continue;
            };
            if self.in_grab_band(point) {
                self.grabbed_by = Some(hand);
                self.last_grab_angle = self.angular_position(point);
                debug!("rotary grabbed by {} hand", hand.as_str());
                return;
            }
        }
    }

    fn release(&mut self) {
        if let Some(hand) = self.grabbed_by.take() {
            debug!("rotary released by {} hand", hand.as_str());
        }
    }
}

// ── Tests ──────────────────────────────────────────────────
