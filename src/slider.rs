//! Single-hand pinch-driven linear slider.
//!
//! A [`LinearDragControl`] maps a pinch point onto the control's local
//! X axis and drives a bounded value in `[0, 1]`. Acquisition records a
//! grab offset so the value never jumps to the finger, and the displayed
//! value is damped toward the drag target.

use glam::Vec3;
use tracing::debug;

use crate::error::{require_positive, ConfigError};
use crate::gesture::GestureState;
use crate::hand::Hand;
use crate::math::{damp, Pose};

// ── Config ─────────────────────────────────────────────────

/// Slider geometry and drag tunables.
#[derive(Debug, Clone)]
pub struct SliderConfig {
    /// Full travel of the handle along the local X axis, in meters.
    /// Value 0 sits at `-travel/2`, value 1 at `+travel/2`.
    pub travel: f32,
    /// Local half-extents of the grab handle.
    pub handle_half_extents: Vec3,
    /// Extra grab margin (meters) around the handle.
    pub padding: f32,
    /// Damping rate (1/s) of the displayed value toward the target.
    pub damping_rate: f32,
    /// Minimum displayed-value movement before the change callback
    /// fires again.
    pub change_epsilon: f32,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            travel: 0.2,
            handle_half_extents: Vec3::new(0.02, 0.02, 0.02),
            padding: 0.015,
            damping_rate: 20.0,
            change_epsilon: 1e-3,
        }
    }
}

impl SliderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("travel", self.travel)?;
        require_positive("damping rate", self.damping_rate)?;
        Ok(())
    }
}

// ── Control ────────────────────────────────────────────────

/// Per-tick result of a slider update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderResult {
    /// Displayed (damped) value in `[0, 1]`.
    pub value: f32,
    /// Whether a hand currently drags the handle.
    pub grabbed: bool,
}

/// Bounded 1-D value dragged by a single pinching hand.
pub struct LinearDragControl {
    config: SliderConfig,
    pose: Pose,
    current_value: f32,
    target_value: f32,
    grabbed_by: Option<Hand>,
    grab_offset: f32,
    ready: bool,
    last_notified: f32,
    on_value_change: Option<Box<dyn FnMut(f32)>>,
}

impl LinearDragControl {
    pub fn new(
        pose: Pose,
        initial_value: f32,
        config: SliderConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let initial = initial_value.clamp(0.0, 1.0);
        Ok(Self {
            config,
            pose,
            current_value: initial,
            target_value: initial,
            grabbed_by: None,
            grab_offset: 0.0,
            ready: true,
            last_notified: initial,
            on_value_change: None,
        })
    }

    pub fn value(&self) -> f32 {
        self.current_value
    }

    pub fn grabbed_by(&self) -> Option<Hand> {
        self.grabbed_by
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Gate interactivity; losing readiness drops an active grab.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Callback invoked with the displayed value whenever it moves more
    /// than the change epsilon, before `update` returns.
    pub fn on_value_change<F>(&mut self, callback: F)
    where
        F: FnMut(f32) + 'static,
    {
        self.on_value_change = Some(Box::new(callback));
    }

    /// Advance the drag one tick.
    pub fn update(
        &mut self,
        left: &GestureState,
        right: &GestureState,
        delta: f64,
    ) -> SliderResult {
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
                    let raw = self.raw_value(point);
                    self.target_value = (raw - self.grab_offset).clamp(0.0, 1.0);
                }
                None => self.release(),
            }
        }

        if self.ready && self.grabbed_by.is_none() {
            self.try_acquire(left, right);
        }

        self.current_value = damp(
            self.current_value,
            self.target_value,
            self.config.damping_rate,
            delta as f32,
        );

        if (self.current_value - self.last_notified).abs() > self.config.change_epsilon {
            self.last_notified = self.current_value;
            if let Some(callback) = self.on_value_change.as_mut() {
                callback(self.current_value);
            }
        }

        SliderResult {
            value: self.current_value,
            grabbed: self.grabbed_by.is_some(),
        }
    }

    /// Unclamped axis value of a world point.
    fn raw_value(&self, world: Vec3) -> f32 {
        self.pose.to_local(world).x / self.config.travel + 0.5
    }

    /// Whether a world point is within the padded handle volume at the
    /// current value.
    fn handle_contains(&self, world: Vec3) -> bool {
        let local = self.pose.to_local(world);
        let handle_x = (self.current_value - 0.5) * self.config.travel;
        let he = self.config.handle_half_extents;
        let pad = self.config.padding;
        (local.x - handle_x).abs() <= he.x + pad
            && local.y.abs() <= he.y + pad
            && local.z.abs() <= he.z + pad
    }

    fn try_acquire(&mut self, left: &GestureState, right: &GestureState) {
        for (hand, state) in [(Hand::Left, left), (Hand::Right, right)] {
            let Some(point) = state.pinch.position.filter(|_| state.pinch.active) else {
                continue;
            };
            if self.handle_contains(point) {
                self.grabbed_by = Some(hand);
                // Anchor the drag so the value does not jump to the
                // finger on acquisition.
                self.grab_offset = self.raw_value(point) - self.current_value;
                debug!("slider grabbed by {} hand", hand.as_str());
                return;
            }
        }
    }

    fn release(&mut self) {
        if let Some(hand) = self.grabbed_by.take() {
            debug!("slider released by {} hand", hand.as_str());
        }
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
pub(crate) fn pinching_at(point: Vec3) -> GestureState {
    use crate::gesture::PinchState;
    GestureState {
        visible: true,
        pinch: PinchState {
            active: true,
            distance: 0.01,
            position: Some(point),
            speed: 0.0,
        },
        ..GestureState::default()
    }
}

// ── Tests ──────────────────────────────────────────────────
