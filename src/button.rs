//! Contact-driven virtual buttons.
//!
//! A [`ContactSurfaceButton`] simulates a pressable surface without real
//! collision detection: every hand contact point (and active pinch point)
//! is transformed into the button's local frame, the deepest hit sets a
//! target press depth, and the visible depth is damped toward it. A
//! hysteresis band between the activation and release thresholds keeps
//! the latch from chattering at the boundary. [`ToggleButton`] wraps one
//! button into a persistent on/off switch.

use glam::Vec3;
use tracing::debug;

use crate::error::{require_positive, ConfigError};
use crate::gesture::GestureState;
use crate::math::{damp, Pose};

// ── Config ─────────────────────────────────────────────────

/// Button geometry and press tunables.
#[derive(Debug, Clone)]
pub struct ButtonConfig {
    /// Local half-extents of the press face (x, y) and plate thickness
    /// (z), in meters.
    pub half_extents: Vec3,
    /// Extra margin (meters) around the face within which a contact
    /// still counts.
    pub padding: f32,
    /// Maximum press travel in meters.
    pub max_depth: f32,
    /// Depth credited to a contact resting exactly on the face, so a
    /// fingertip pad registers before its tracked center crosses the
    /// surface.
    pub contact_bias: f32,
    /// Press ratio at which the button activates.
    pub activation_threshold: f32,
    /// Press ratio at or below which a latched button releases. Must be
    /// below `activation_threshold`; the gap is the hysteresis band.
    pub release_threshold: f32,
    /// Damping rate (1/s) of the visible depth toward the target depth.
    pub damping_rate: f32,
    /// Depth difference below which the damped value snaps to target.
    pub snap_epsilon: f32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            half_extents: Vec3::new(0.04, 0.04, 0.01),
            padding: 0.01,
            max_depth: 0.02,
            contact_bias: 0.005,
            activation_threshold: 0.7,
            release_threshold: 0.3,
            damping_rate: 25.0,
            snap_epsilon: 1e-4,
        }
    }
}

impl ButtonConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("max depth", self.max_depth)?;
        require_positive("damping rate", self.damping_rate)?;
        require_positive("activation threshold", self.activation_threshold)?;
        if self.release_threshold >= self.activation_threshold {
            return Err(ConfigError::ActivationBand {
                activation: self.activation_threshold,
                release: self.release_threshold,
            });
        }
        Ok(())
    }
}

// ── Button ─────────────────────────────────────────────────

/// Per-tick result of a button update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressResult {
    /// Current press depth over max depth, in `[0, 1]`.
    pub ratio: f32,
    /// The press crossed the activation threshold this tick.
    pub just_activated: bool,
    /// A latched press fell to the release threshold this tick.
    pub just_released: bool,
}

/// A pressable surface driven by hand contact points.
pub struct ContactSurfaceButton {
    config: ButtonConfig,
    pose: Pose,
    current_depth: f32,
    target_depth: f32,
    latched: bool,
    ready: bool,
}

impl ContactSurfaceButton {
    pub fn new(pose: Pose, config: ButtonConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            pose,
            current_depth: 0.0,
            target_depth: 0.0,
            latched: false,
            ready: true,
        })
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Gate interactivity. While not ready the target depth is zero;
    /// a latched press still releases cleanly as the depth decays.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Current press depth over max depth.
    pub fn press_ratio(&self) -> f32 {
        self.current_depth / self.config.max_depth
    }

    /// Advance the press simulation one tick.
    pub fn update(
        &mut self,
        left: &GestureState,
        right: &GestureState,
        delta: f64,
    ) -> PressResult {
        self.target_depth = if self.ready {
            self.deepest_hit(left).max(self.deepest_hit(right))
        } else {
            0.0
        };

        self.current_depth = damp(
            self.current_depth,
            self.target_depth,
            self.config.damping_rate,
            delta as f32,
        );
        if (self.target_depth - self.current_depth).abs() <= self.config.snap_epsilon {
            self.current_depth = self.target_depth;
        }

        let ratio = self.press_ratio();
        let mut just_activated = false;
        let mut just_released = false;
        if !self.latched && self.ready && ratio >= self.config.activation_threshold {
            self.latched = true;
            just_activated = true;
            debug!("button activated at ratio {:.2}", ratio);
        } else if self.latched && ratio <= self.config.release_threshold {
            self.latched = false;
            just_released = true;
            debug!("button released at ratio {:.2}", ratio);
        }

        PressResult {
            ratio,
            just_activated,
            just_released,
        }
    }

    /// Deepest press this hand produces, zero with no qualifying hit.
    fn deepest_hit(&self, state: &GestureState) -> f32 {
        let mut deepest = 0.0f32;
        let pinch_point = state.pinch.position.filter(|_| state.pinch.active);
        for point in state.contact_points.iter().copied().chain(pinch_point) {
            let local = self.pose.to_local(point);
            if local.x.abs() > self.config.half_extents.x + self.config.padding
                || local.y.abs() > self.config.half_extents.y + self.config.padding
            {
                continue;
            }
            let depth = self.config.half_extents.z - local.z + self.config.contact_bias;
            if depth > 0.0 {
                deepest = deepest.max(depth.min(self.config.max_depth));
            }
        }
        deepest
    }
}

// ── Toggle ─────────────────────────────────────────────────

/// A button with a persistent on/off value, flipped on every activation.
pub struct ToggleButton {
    button: ContactSurfaceButton,
    value: bool,
    on_toggle: Option<Box<dyn FnMut(bool)>>,
}

impl ToggleButton {
    pub fn new(button: ContactSurfaceButton) -> Self {
        Self {
            button,
            value: false,
            on_toggle: None,
        }
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn button(&self) -> &ContactSurfaceButton {
        &self.button
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.button.set_ready(ready);
    }

    /// Callback invoked with the new value on every flip, before
    /// `update` returns.
    pub fn on_toggle<F>(&mut self, callback: F)
    where
        F: FnMut(bool) + 'static,
    {
        self.on_toggle = Some(Box::new(callback));
    }

    pub fn update(
        &mut self,
        left: &GestureState,
        right: &GestureState,
        delta: f64,
    ) -> PressResult {
        let result = self.button.update(left, right, delta);
        if result.just_activated {
            self.value = !self.value;
            debug!("toggle flipped to {}", self.value);
            if let Some(callback) = self.on_toggle.as_mut() {
                callback(self.value);
            }
        }
        result
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn contact_hand(points: Vec<Vec3>) -> GestureState {
    GestureState {
        visible: true,
        contact_points: points,
        ..GestureState::default()
    }
}

#[cfg(test)]
fn idle_hand() -> GestureState {
    GestureState::default()
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::PinchState;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f64 = 1.0 / 60.0;

    fn button() -> ContactSurfaceButton {
        ContactSurfaceButton::new(Pose::IDENTITY, ButtonConfig::default()).unwrap()
    }

    /// A point on the button axis pressed to full travel with defaults.
    fn full_press_point() -> Vec3 {
        // depth = hz - z + bias = 0.01 + 0.005 + 0.005 = 0.02 = max_depth
        Vec3::new(0.0, 0.0, -0.005)
    }

    #[test]
    fn test_config_validation() {
        assert!(ButtonConfig::default().validate().is_ok());
        let inverted = ButtonConfig {
            activation_threshold: 0.3,
            release_threshold: 0.7,
            ..ButtonConfig::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::ActivationBand { .. }),
        ));
        let flat = ButtonConfig {
            max_depth: 0.0,
            ..ButtonConfig::default()
        };
        assert!(flat.validate().is_err());
    }

    #[test]
    fn test_activation_and_release_fire_exactly_once() {
        let mut button = button();
        let pressing = contact_hand(vec![full_press_point()]);

        let mut activations = 0;
        let mut releases = 0;
        for _ in 0..30 {
            let result = button.update(&pressing, &idle_hand(), DT);
            activations += result.just_activated as u32;
            releases += result.just_released as u32;
        }
        assert_eq!(activations, 1, "activation must fire exactly once");
        assert_eq!(releases, 0, "no release while held");
        assert!(button.press_ratio() > 0.9);

        // Contact withdrawn: depth decays, release fires exactly once.
        for _ in 0..60 {
            let result = button.update(&idle_hand(), &idle_hand(), DT);
            activations += result.just_activated as u32;
            releases += result.just_released as u32;
        }
        assert_eq!(activations, 1);
        assert_eq!(releases, 1, "release must fire exactly once");
        assert!(button.press_ratio() < 0.05);
    }

    #[test]
    fn test_hysteresis_band_suppresses_chatter() {
        // Hold the press ratio inside the band between release (0.3) and
        // activation (0.7): after activating once, nothing more fires.
        let mut button = button();
        let pressing = contact_hand(vec![full_press_point()]);
        for _ in 0..30 {
            button.update(&pressing, &idle_hand(), DT);
        }

        // Target a mid-band depth of 0.01 (ratio 0.5).
        // depth = 0.01 - z + 0.005 = 0.01  =>  z = 0.005
        let half_press = contact_hand(vec![Vec3::new(0.0, 0.0, 0.005)]);
        for _ in 0..60 {
            let result = button.update(&half_press, &idle_hand(), DT);
            assert!(!result.just_activated);
            assert!(!result.just_released);
        }
        let ratio = button.press_ratio();
        assert!(
            (ratio - 0.5).abs() < 0.05,
            "expected mid-band ratio, got {}",
            ratio,
        );
    }

    #[test]
    fn test_contact_outside_face_ignored() {
        let mut button = button();
        // Face is 0.04 half-extent + 0.01 padding; x = 0.06 misses.
        let missing = contact_hand(vec![Vec3::new(0.06, 0.0, -0.005)]);
        for _ in 0..30 {
            let result = button.update(&missing, &idle_hand(), DT);
            assert_eq!(result.ratio, 0.0);
        }
    }

    #[test]
    fn test_active_pinch_point_presses() {
        let mut pressed = button();
        let mut untouched = button();

        let pinching = GestureState {
            visible: true,
            pinch: PinchState {
                active: true,
                distance: 0.01,
                position: Some(full_press_point()),
                speed: 0.0,
            },
            ..GestureState::default()
        };
        let mut activated = false;
        for _ in 0..30 {
            activated |= pressed.update(&idle_hand(), &pinching, DT).just_activated;
        }
        assert!(activated, "an active pinch point must press the button");

        // An inactive pinch position is not a contact.
        let not_pinching = GestureState {
            visible: true,
            pinch: PinchState {
                active: false,
                distance: 0.1,
                position: Some(full_press_point()),
                speed: 0.0,
            },
            ..GestureState::default()
        };
        for _ in 0..30 {
            let result = untouched.update(&idle_hand(), &not_pinching, DT);
            assert_eq!(result.ratio, 0.0);
        }
    }

    #[test]
    fn test_not_ready_ignores_contacts() {
        let mut button = button();
        button.set_ready(false);
        let pressing = contact_hand(vec![full_press_point()]);
        for _ in 0..30 {
            let result = button.update(&pressing, &idle_hand(), DT);
            assert!(!result.just_activated);
            assert_eq!(result.ratio, 0.0);
        }
    }

    #[test]
    fn test_deepest_of_both_hands_wins() {
        let mut button = button();
        // Left presses shallow (z=0.008 -> depth 0.007), right deep.
        let shallow = contact_hand(vec![Vec3::new(0.0, 0.0, 0.008)]);
        let deep = contact_hand(vec![full_press_point()]);
        for _ in 0..60 {
            button.update(&shallow, &deep, DT);
        }
        assert!(button.press_ratio() > 0.9, "deep press must win");
    }

    #[test]
    fn test_toggle_flips_and_notifies() {
        let mut toggle = ToggleButton::new(button());
        let log: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
        let log_cb = Rc::clone(&log);
        toggle.on_toggle(move |v| log_cb.borrow_mut().push(v));

        let pressing = contact_hand(vec![full_press_point()]);

        // Press and hold: one flip to true.
        for _ in 0..30 {
            toggle.update(&pressing, &idle_hand(), DT);
        }
        assert!(toggle.value());
        assert_eq!(*log.borrow(), vec![true]);

        // Withdraw, press again: flip back to false.
        for _ in 0..60 {
            toggle.update(&idle_hand(), &idle_hand(), DT);
        }
        for _ in 0..30 {
            toggle.update(&pressing, &idle_hand(), DT);
        }
        assert!(!toggle.value());
        assert_eq!(*log.borrow(), vec![true, false]);
    }
}
