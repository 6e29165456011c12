//! Bimanual grab-and-transform of a manipulable target.
//!
//! A [`ManipulationArbiter`] watches both hands' gesture states and walks
//! an Idle -> Highlighted -> Engaged state machine. While engaged it
//! applies a drift-free incremental rigid transform (translate, rotate,
//! uniformly scale) derived from the two hands' representative points.
//! A single [`GrabLock`] shared across all arbiters guarantees that at
//! most one target is engaged at a time.

use std::cell::Cell;
use std::rc::Rc;

use glam::{Quat, Vec3};
use tracing::{debug, trace};

use crate::error::{require_positive, ConfigError};
use crate::gesture::GestureState;
use crate::math::{BoxBounds, Pose};

// ── Exclusivity lock ───────────────────────────────────────

/// Shared exclusivity lock naming the currently-engaged arbiter.
///
/// Clone one instance into every arbiter of a scene; clones share the
/// same owner cell. Acquisition and release happen solely inside the
/// arbiter state machine.
#[derive(Clone, Default)]
pub struct GrabLock {
    inner: Rc<LockInner>,
}

#[derive(Default)]
struct LockInner {
    owner: Cell<Option<u64>>,
    next_id: Cell<u64>,
}

impl GrabLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no arbiter currently holds the lock.
    pub fn is_free(&self) -> bool {
        self.inner.owner.get().is_none()
    }

    fn issue_id(&self) -> u64 {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        id
    }

    fn held_by(&self, id: u64) -> bool {
        self.inner.owner.get() == Some(id)
    }

    fn try_acquire(&self, id: u64) -> bool {
        match self.inner.owner.get() {
            None => {
                self.inner.owner.set(Some(id));
                true
            }
            Some(owner) => owner == id,
        }
    }

    /// Clears the lock only if `id` is the current owner.
    fn release(&self, id: u64) -> bool {
        if self.held_by(id) {
            self.inner.owner.set(None);
            true
        } else {
            false
        }
    }
}

// ── Target ─────────────────────────────────────────────────

/// An object subject to bimanual grab: world pose, uniform scale, and a
/// local-space bounding volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulableTarget {
    pub pose: Pose,
    pub scale: f32,
    pub bounds: BoxBounds,
}

impl ManipulableTarget {
    pub fn new(pose: Pose, scale: f32, bounds: BoxBounds) -> Self {
        Self {
            pose,
            scale,
            bounds,
        }
    }
}

// ── Config ─────────────────────────────────────────────────

/// Arbiter tunables.
#[derive(Debug, Clone)]
pub struct ManipulationConfig {
    /// Proximity tolerance (meters) added to the target bounds for the
    /// Idle -> Highlighted transition.
    pub highlight_padding: f32,
    /// Larger tolerance a hand may drift to while engaged before the
    /// session releases. Must be at least `highlight_padding`.
    pub release_padding: f32,
    /// Uniform scale clamp.
    pub min_scale: f32,
    pub max_scale: f32,
    /// Inter-hand distance (meters) below which rotation and scale are
    /// held for the tick instead of dividing by a near-zero basis.
    pub min_separation: f32,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            highlight_padding: 0.04,
            release_padding: 0.10,
            min_scale: 0.5,
            max_scale: 2.0,
            min_separation: 1e-3,
        }
    }
}

impl ManipulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("min scale", self.min_scale)?;
        require_positive("min separation", self.min_separation)?;
        if self.min_scale > self.max_scale {
            return Err(ConfigError::ScaleBounds {
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        if self.release_padding < self.highlight_padding {
            return Err(ConfigError::PaddingBand {
                highlight: self.highlight_padding,
                release: self.release_padding,
            });
        }
        Ok(())
    }
}

// ── State machine ──────────────────────────────────────────

/// Arbiter phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManipulationPhase {
    Idle,
    Highlighted,
    Engaged,
}

impl ManipulationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Highlighted => "highlighted",
            Self::Engaged => "engaged",
        }
    }
}

/// Geometry captured at grab-start; lives only while Engaged.
#[derive(Debug, Clone, Copy)]
struct GrabSession {
    start_midpoint: Vec3,
    /// Target position minus the starting midpoint.
    offset: Vec3,
    start_dir: Vec3,
    start_distance: f32,
    start_orientation: Quat,
    start_scale: f32,
}

/// Per-tick result of [`ManipulationArbiter::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManipulationResult {
    /// Both hands are in range and the target could engage (or is
    /// engaged).
    pub ready: bool,
    /// The target is engaged and following the hands.
    pub grabbing: bool,
}

/// Drives one manipulable target from two hands' gesture states.
pub struct ManipulationArbiter {
    id: u64,
    lock: GrabLock,
    config: ManipulationConfig,
    target: ManipulableTarget,
    phase: ManipulationPhase,
    session: Option<GrabSession>,
    interactive: bool,
    last_ready: bool,
    on_ready_change: Option<Box<dyn FnMut(bool)>>,
}

impl ManipulationArbiter {
    /// Create an arbiter for `target`, sharing `lock` with every other
    /// arbiter in the scene.
    pub fn new(
        target: ManipulableTarget,
        config: ManipulationConfig,
        lock: &GrabLock,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id: lock.issue_id(),
            lock: lock.clone(),
            config,
            target,
            phase: ManipulationPhase::Idle,
            session: None,
            interactive: true,
            last_ready: false,
            on_ready_change: None,
        })
    }

    pub fn target(&self) -> &ManipulableTarget {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut ManipulableTarget {
        &mut self.target
    }

    pub fn phase(&self) -> ManipulationPhase {
        self.phase
    }

    /// Gate interactivity. While not ready the arbiter neither highlights
    /// nor engages, and an active session releases on the next update.
    pub fn set_ready(&mut self, ready: bool) {
        self.interactive = ready;
    }

    /// Callback invoked with the new readiness whenever it changes,
    /// before `update` returns.
    pub fn on_ready_change<F>(&mut self, callback: F)
    where
        F: FnMut(bool) + 'static,
    {
        self.on_ready_change = Some(Box::new(callback));
    }

    /// Advance the state machine one tick.
    pub fn update(
        &mut self,
        left: &GestureState,
        right: &GestureState,
    ) -> ManipulationResult {
        let left_point = representative_point(left);
        let right_point = representative_point(right);

        if self.phase == ManipulationPhase::Engaged {
            match (left_point, right_point) {
                (Some(l), Some(r))
                    if self.interactive
                        && left.grab
                        && right.grab
                        && self.in_range(l, self.config.release_padding)
                        && self.in_range(r, self.config.release_padding)
                        && self.lock.held_by(self.id) =>
                {
                    self.apply_transform(l, r);
                }
                _ => self.disengage(),
            }
        }

        if self.phase != ManipulationPhase::Engaged {
            let near_pair = match (left_point, right_point) {
                (Some(l), Some(r))
                    if self.in_range(l, self.config.highlight_padding)
                        && self.in_range(r, self.config.highlight_padding) =>
                {
                    Some((l, r))
                }
                _ => None,
            };
            let lock_obtainable = self.lock.is_free() || self.lock.held_by(self.id);
            let eligible = self.interactive && near_pair.is_some() && lock_obtainable;
            self.phase = if eligible {
                ManipulationPhase::Highlighted
            } else {
                ManipulationPhase::Idle
            };
            if eligible && left.grab && right.grab {
                if let Some((l, r)) = near_pair {
                    self.try_engage(l, r);
                }
            }
        }

        let ready = self.phase != ManipulationPhase::Idle;
        if ready != self.last_ready {
            self.last_ready = ready;
            if let Some(callback) = self.on_ready_change.as_mut() {
                callback(ready);
            }
        }
        ManipulationResult {
            ready,
            grabbing: self.phase == ManipulationPhase::Engaged,
        }
    }

    /// Whether a world point is inside the target bounds grown by
    /// `padding`.
    fn in_range(&self, world: Vec3, padding: f32) -> bool {
        let local = self.target.pose.to_local(world);
        self.target.bounds.contains(local, padding)
    }

    fn try_engage(&mut self, l: Vec3, r: Vec3) {
        let span = r - l;
        let distance = span.length();
        if distance <= self.config.min_separation {
            // Degenerate basis at grab-start; stay highlighted.
            return;
        }
        if !self.lock.try_acquire(self.id) {
            // Held elsewhere: engagement refused, not an error.
            return;
        }
        let midpoint = (l + r) * 0.5;
        self.session = Some(GrabSession {
            start_midpoint: midpoint,
            offset: self.target.pose.position - midpoint,
            start_dir: span / distance,
            start_distance: distance,
            start_orientation: self.target.pose.orientation,
            start_scale: self.target.scale,
        });
        self.phase = ManipulationPhase::Engaged;
        debug!("manipulation engaged (arbiter {})", self.id);
    }

    /// Recompute the target transform from the live hand points. All
    /// quantities derive from the grab-start capture, so holding still
    /// never accumulates drift.
    fn apply_transform(&mut self, l: Vec3, r: Vec3) {
        let Some(session) = self.session else {
            return;
        };
        let midpoint = (l + r) * 0.5;
        let span = r - l;
        let distance = span.length();
        if distance > self.config.min_separation {
            let live_dir = span / distance;
            let arc = Quat::from_rotation_arc(session.start_dir, live_dir);
            self.target.pose.orientation = (arc * session.start_orientation).normalize();
            self.target.scale = (session.start_scale * distance / session.start_distance)
                .clamp(self.config.min_scale, self.config.max_scale);
        }
        // Hands collapsed onto each other: hold rotation and scale for
        // the tick, keep translating.
        self.target.pose.position = midpoint + session.offset;
        trace!(
            "manipulation drag {:.3}m (arbiter {})",
            (midpoint - session.start_midpoint).length(),
            self.id,
        );
    }

    fn disengage(&mut self) {
        self.lock.release(self.id);
        self.session = None;
        self.phase = ManipulationPhase::Idle;
        debug!("manipulation released (arbiter {})", self.id);
    }
}

/// Manipulation contact point for one hand: palm, falling back to wrist.
fn representative_point(state: &GestureState) -> Option<Vec3> {
    state.palm.or(state.wrist)
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn hand_at(palm: Vec3, grab: bool) -> GestureState {
    GestureState {
        visible: true,
        palm: Some(palm),
        wrist: Some(palm),
        grab,
        ..GestureState::default()
    }
}

#[cfg(test)]
fn panel_arbiter(lock: &GrabLock) -> ManipulationArbiter {
    let target = ManipulableTarget::new(
        Pose::IDENTITY,
        1.0,
        BoxBounds::new(Vec3::new(0.2, 0.2, 0.2)),
    );
    ManipulationArbiter::new(target, ManipulationConfig::default(), lock).unwrap()
}

// ── Tests ──────────────────────────────────────────────────
