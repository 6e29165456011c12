//! Gesture classification from hand-joint snapshots.
//!
//! Each tick, [`HandGestureTracker::update`] rebuilds a [`GestureState`]
//! from the raw joint positions: pinch from thumb/index tip proximity,
//! grab and open-hand from the average fingertip-to-wrist distance, with
//! a dead zone between the two thresholds that prevents flicker by
//! construction. Edge transitions are published to the shared
//! [`EventBus`](crate::events::EventBus).

use std::rc::Rc;

use glam::Vec3;
use tracing::debug;

use crate::error::{require_positive, ConfigError};
use crate::events::{EventBus, GestureEvent, GestureTopic};
use crate::hand::{Hand, HandJoint, HandSnapshot};

// ── State ──────────────────────────────────────────────────

/// Pinch gesture data for one hand.
#[derive(Debug, Clone, PartialEq)]
pub struct PinchState {
    /// Whether the thumb and index tips are within the pinch threshold.
    pub active: bool,
    /// Distance between thumb tip and index tip in meters.
    /// `f32::INFINITY` when either tip is untracked.
    pub distance: f32,
    /// Midpoint of the two tips while active.
    pub position: Option<Vec3>,
    /// Pinch-point speed in m/s. Zero on the tick a pinch starts.
    pub speed: f32,
}

impl Default for PinchState {
    fn default() -> Self {
        Self {
            active: false,
            distance: f32::INFINITY,
            position: None,
            speed: 0.0,
        }
    }
}

/// Semantic gesture state for one hand, rebuilt every tick.
///
/// When `visible` is false every positional field is `None`, every boolean
/// is false, and `contact_points` is empty.
#[derive(Debug, Clone, Default)]
pub struct GestureState {
    /// Whether the hand was tracked this tick.
    pub visible: bool,
    /// Wrist position.
    pub wrist: Option<Vec3>,
    /// Estimated palm center: metacarpal average, falling back to the
    /// fingertip average, falling back to the wrist. Preferred over the
    /// wrist as the manipulation contact point for stability under wrist
    /// rotation.
    pub palm: Option<Vec3>,
    /// Index fingertip position.
    pub index_tip: Option<Vec3>,
    /// Thumb fingertip position.
    pub thumb_tip: Option<Vec3>,
    /// Pinch gesture data.
    pub pinch: PinchState,
    /// Fist closed below the grab threshold.
    pub grab: bool,
    /// Hand opened above the open threshold. Never true together with
    /// `grab`.
    pub open: bool,
    /// Wrist plus the tracked non-thumb fingertips, for surface contact
    /// testing.
    pub contact_points: Vec<Vec3>,
}

// ── Config ─────────────────────────────────────────────────

/// Gesture classification thresholds.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Maximum thumb-to-index tip distance (meters) for a pinch. One
    /// threshold serves both acquire and release.
    pub pinch_threshold: f32,
    /// Average fingertip-to-wrist distance (meters) below which the hand
    /// counts as grabbing.
    pub grab_threshold: f32,
    /// Average fingertip-to-wrist distance (meters) above which the hand
    /// counts as open. Must exceed `grab_threshold`; the gap between the
    /// two is the anti-flicker dead zone.
    pub open_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.025,
            grab_threshold: 0.09,
            open_threshold: 0.13,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("pinch threshold", self.pinch_threshold)?;
        require_positive("grab threshold", self.grab_threshold)?;
        if self.grab_threshold >= self.open_threshold {
            return Err(ConfigError::ThresholdBand {
                grab: self.grab_threshold,
                open: self.open_threshold,
            });
        }
        Ok(())
    }
}

// ── Tracker ────────────────────────────────────────────────

/// Prior-tick booleans and pinch position, swapped each update.
#[derive(Debug, Clone, Default)]
struct PrevTick {
    pinching: bool,
    grabbing: bool,
    open: bool,
    pinch_position: Option<Vec3>,
}

/// Per-hand gesture tracker.
///
/// Owns the hand's current [`GestureState`] and the previous tick's
/// snapshot, and publishes edge events to the injected bus.
pub struct HandGestureTracker {
    hand: Hand,
    config: GestureConfig,
    bus: Rc<EventBus>,
    state: GestureState,
    prev: PrevTick,
}

impl HandGestureTracker {
    pub fn new(
        hand: Hand,
        config: GestureConfig,
        bus: Rc<EventBus>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            hand,
            config,
            bus,
            state: GestureState::default(),
            prev: PrevTick::default(),
        })
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    /// The state computed by the most recent `update`.
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Recompute the gesture state for this tick and fire edge events.
    ///
    /// `time` is the host clock in seconds, `delta` the elapsed seconds
    /// since the previous tick. Events fire synchronously before this
    /// returns; each carries a clone of the new state.
    pub fn update(
        &mut self,
        snapshot: &HandSnapshot,
        time: f64,
        delta: f64,
    ) -> &GestureState {
        let next = self.classify(snapshot, delta);
        let events = self.edge_events(&next, time, delta);

        self.prev = PrevTick {
            pinching: next.pinch.active,
            grabbing: next.grab,
            open: next.open,
            pinch_position: next.pinch.position,
        };
        self.state = next;

        for event in &events {
            self.bus.dispatch(event);
        }
        &self.state
    }

    /// Build the new state from the raw snapshot.
    fn classify(&self, snapshot: &HandSnapshot, delta: f64) -> GestureState {
        if !snapshot.visible {
            return GestureState::default();
        }

        let wrist = snapshot.position(HandJoint::Wrist);
        let thumb_tip = snapshot.position(HandJoint::ThumbTip);
        let index_tip = snapshot.position(HandJoint::IndexTip);
        let palm = estimate_palm(snapshot);

        // Pinch: thumb tip to index tip.
        let mut pinch = PinchState::default();
        if let (Some(thumb), Some(index)) = (thumb_tip, index_tip) {
            pinch.distance = (thumb - index).length();
            pinch.active = pinch.distance < self.config.pinch_threshold;
            if pinch.active {
                let position = (thumb + index) * 0.5;
                pinch.position = Some(position);
                // Speed only once the previous tick was already pinching,
                // so a fresh pinch never reports a spurious spike.
                if self.prev.pinching && delta > 0.0 {
                    if let Some(prev_pos) = self.prev.pinch_position {
                        pinch.speed = (position - prev_pos).length() / delta as f32;
                    }
                }
            }
        }

        // Grab/open: average distance of tracked non-thumb fingertips to
        // the wrist. Disjoint bands on the same metric, so the two can
        // never hold simultaneously.
        let mut grab = false;
        let mut open = false;
        if let Some(wrist_pos) = wrist {
            let mut sum = 0.0;
            let mut count = 0u32;
            for joint in HandJoint::grip_fingertips() {
                if let Some(tip) = snapshot.position(joint) {
                    sum += (tip - wrist_pos).length();
                    count += 1;
                }
            }
            if count > 0 {
                let avg = sum / count as f32;
                grab = avg < self.config.grab_threshold;
                open = avg > self.config.open_threshold;
            }
        }

        let mut contact_points = Vec::with_capacity(5);
        if let Some(wrist_pos) = wrist {
            contact_points.push(wrist_pos);
        }
        for joint in HandJoint::grip_fingertips() {
            if let Some(tip) = snapshot.position(joint) {
                contact_points.push(tip);
            }
        }

        GestureState {
            visible: true,
            wrist,
            palm,
            index_tip,
            thumb_tip,
            pinch,
            grab,
            open,
            contact_points,
        }
    }

    /// Compare the new state against the prior tick and build the events
    /// to fire, in pinch/grab/open order.
    fn edge_events(&self, next: &GestureState, time: f64, delta: f64) -> Vec<GestureEvent> {
        let mut topics = Vec::with_capacity(4);

        if next.pinch.active && !self.prev.pinching {
            debug!("{} pinch start", self.hand.as_str());
            topics.push(GestureTopic::PinchStart);
        }
        if next.pinch.active {
            topics.push(GestureTopic::Pinch);
        }
        if !next.pinch.active && self.prev.pinching {
            debug!("{} pinch end", self.hand.as_str());
            topics.push(GestureTopic::PinchEnd);
        }

        if next.grab && !self.prev.grabbing {
            debug!("{} grab start", self.hand.as_str());
            topics.push(GestureTopic::GrabStart);
        }
        if !next.grab && self.prev.grabbing {
            debug!("{} grab end", self.hand.as_str());
            topics.push(GestureTopic::GrabEnd);
        }

        if next.open && !self.prev.open {
            topics.push(GestureTopic::OpenStart);
        }
        if !next.open && self.prev.open {
            topics.push(GestureTopic::OpenEnd);
        }

        topics
            .into_iter()
            .map(|topic| GestureEvent {
                topic,
                hand: self.hand,
                state: next.clone(),
                time,
                delta,
            })
            .collect()
    }
}

/// Palm-center estimate: metacarpal average, then fingertip average, then
/// wrist.
fn estimate_palm(snapshot: &HandSnapshot) -> Option<Vec3> {
    snapshot
        .average_position(&HandJoint::metacarpal_joints())
        .or_else(|| snapshot.average_position(&HandJoint::fingertip_joints()))
        .or_else(|| snapshot.position(HandJoint::Wrist))
}

// ── Test helpers ───────────────────────────────────────────

/// Snapshot with wrist at `wrist` and all four grip fingertips `spread`
/// meters from it along +Y; thumb/index tips `pinch_gap` apart.
#[cfg(test)]
pub(crate) fn test_snapshot(wrist: Vec3, spread: f32, pinch_gap: f32) -> HandSnapshot {
    let mut snapshot = HandSnapshot::visible();
    snapshot.set(HandJoint::Wrist, wrist);
    for joint in HandJoint::grip_fingertips() {
        snapshot.set(joint, wrist + Vec3::new(0.0, spread, 0.0));
    }
    snapshot.set(HandJoint::ThumbTip, wrist + Vec3::new(0.0, spread, 0.02));
    snapshot.set(
        HandJoint::IndexTip,
        wrist + Vec3::new(pinch_gap, spread, 0.02),
    );
    snapshot
}

// ── Tests ──────────────────────────────────────────────────
