//! Hand and joint model.
//!
//! Models the 26 joints per hand of the XR_EXT_hand_tracking skeleton and
//! the per-tick snapshot of tracked joint positions handed in by the
//! tracking collaborator. Joints may be individually absent; an invisible
//! hand carries no joints at all.

use glam::Vec3;
use tracing::debug;

// ── Joint definitions ──────────────────────────────────────

/// The 26 hand joints defined by XR_EXT_hand_tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Palm,
    Wrist,
    ThumbMetacarpal,
    ThumbProximal,
    ThumbDistal,
    ThumbTip,
    IndexMetacarpal,
    IndexProximal,
    IndexIntermediate,
    IndexDistal,
    IndexTip,
    MiddleMetacarpal,
    MiddleProximal,
    MiddleIntermediate,
    MiddleDistal,
    MiddleTip,
    RingMetacarpal,
    RingProximal,
    RingIntermediate,
    RingDistal,
    RingTip,
    LittleMetacarpal,
    LittleProximal,
    LittleIntermediate,
    LittleDistal,
    LittleTip,
}

/// Total number of joints per hand.
pub const JOINT_COUNT: usize = 26;

impl HandJoint {
    /// Convert joint enum to array index (0-25).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Joint name as supplied by tracking collaborators.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Palm => "palm",
            Self::Wrist => "wrist",
            Self::ThumbMetacarpal => "thumb-metacarpal",
            Self::ThumbProximal => "thumb-proximal",
            Self::ThumbDistal => "thumb-distal",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMetacarpal => "index-metacarpal",
            Self::IndexProximal => "index-proximal",
            Self::IndexIntermediate => "index-intermediate",
            Self::IndexDistal => "index-distal",
            Self::IndexTip => "index-tip",
            Self::MiddleMetacarpal => "middle-metacarpal",
            Self::MiddleProximal => "middle-proximal",
            Self::MiddleIntermediate => "middle-intermediate",
            Self::MiddleDistal => "middle-distal",
            Self::MiddleTip => "middle-tip",
            Self::RingMetacarpal => "ring-metacarpal",
            Self::RingProximal => "ring-proximal",
            Self::RingIntermediate => "ring-intermediate",
            Self::RingDistal => "ring-distal",
            Self::RingTip => "ring-tip",
            Self::LittleMetacarpal => "little-metacarpal",
            Self::LittleProximal => "little-proximal",
            Self::LittleIntermediate => "little-intermediate",
            Self::LittleDistal => "little-distal",
            Self::LittleTip => "little-tip",
        }
    }

    /// Parse a joint name string.
    pub fn from_name(s: &str) -> Option<HandJoint> {
        match s {
            "palm" => Some(Self::Palm),
            "wrist" => Some(Self::Wrist),
            "thumb-metacarpal" => Some(Self::ThumbMetacarpal),
            "thumb-proximal" => Some(Self::ThumbProximal),
            "thumb-distal" => Some(Self::ThumbDistal),
            "thumb-tip" => Some(Self::ThumbTip),
            "index-metacarpal" => Some(Self::IndexMetacarpal),
            "index-proximal" => Some(Self::IndexProximal),
            "index-intermediate" => Some(Self::IndexIntermediate),
            "index-distal" => Some(Self::IndexDistal),
            "index-tip" => Some(Self::IndexTip),
            "middle-metacarpal" => Some(Self::MiddleMetacarpal),
            "middle-proximal" => Some(Self::MiddleProximal),
            "middle-intermediate" => Some(Self::MiddleIntermediate),
            "middle-distal" => Some(Self::MiddleDistal),
            "middle-tip" => Some(Self::MiddleTip),
            "ring-metacarpal" => Some(Self::RingMetacarpal),
            "ring-proximal" => Some(Self::RingProximal),
            "ring-intermediate" => Some(Self::RingIntermediate),
            "ring-distal" => Some(Self::RingDistal),
            "ring-tip" => Some(Self::RingTip),
            "little-metacarpal" => Some(Self::LittleMetacarpal),
            "little-proximal" => Some(Self::LittleProximal),
            "little-intermediate" => Some(Self::LittleIntermediate),
            "little-distal" => Some(Self::LittleDistal),
            "little-tip" => Some(Self::LittleTip),
            _ => None,
        }
    }

    /// All five fingertip joints.
    pub fn fingertip_joints() -> [HandJoint; 5] {
        [
            Self::ThumbTip,
            Self::IndexTip,
            Self::MiddleTip,
            Self::RingTip,
            Self::LittleTip,
        ]
    }

    /// The four non-thumb fingertips used for the fist metric and for
    /// contact-point generation. The thumb is excluded because it carries
    /// the pinch gesture and would bias the closed-hand average.
    pub fn grip_fingertips() -> [HandJoint; 4] {
        [
            Self::IndexTip,
            Self::MiddleTip,
            Self::RingTip,
            Self::LittleTip,
        ]
    }

    /// All five metacarpal joints, preferred for the palm-center estimate.
    pub fn metacarpal_joints() -> [HandJoint; 5] {
        [
            Self::ThumbMetacarpal,
            Self::IndexMetacarpal,
            Self::MiddleMetacarpal,
            Self::RingMetacarpal,
            Self::LittleMetacarpal,
        ]
    }
}

// ── Hand enum ──────────────────────────────────────────────

/// Which hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn from_name(s: &str) -> Option<Hand> {
        match s {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

// ── Snapshot ───────────────────────────────────────────────

/// One tick's worth of tracked joint positions for a single hand.
///
/// Joints the tracking collaborator could not resolve this tick are `None`.
/// A snapshot with `visible == false` carries no joint data.
#[derive(Debug, Clone)]
pub struct HandSnapshot {
    /// Whether the hand was tracked at all this tick.
    pub visible: bool,
    /// World positions indexed by `HandJoint`.
    joints: [Option<Vec3>; JOINT_COUNT],
}

impl HandSnapshot {
    /// Snapshot of an untracked hand.
    pub fn hidden() -> Self {
        Self {
            visible: false,
            joints: [None; JOINT_COUNT],
        }
    }

    /// Snapshot of a tracked hand with no joints resolved yet.
    pub fn visible() -> Self {
        Self {
            visible: true,
            joints: [None; JOINT_COUNT],
        }
    }

    /// Build a visible snapshot from the collaborator's name-to-position
    /// mapping. Unknown joint names are skipped.
    pub fn from_named_positions<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, [f32; 3])>,
    {
        let mut snapshot = Self::visible();
        for (name, pos) in entries {
            match HandJoint::from_name(name) {
                Some(joint) => snapshot.set(joint, Vec3::from_array(pos)),
                None => debug!("Hand snapshot: unknown joint name '{}'", name),
            }
        }
        snapshot
    }

    /// Record a joint position.
    pub fn set(&mut self, joint: HandJoint, position: Vec3) {
        self.joints[joint.index()] = Some(position);
    }

    /// Position of a joint, if resolved this tick.
    pub fn position(&self, joint: HandJoint) -> Option<Vec3> {
        if !self.visible {
            return None;
        }
        self.joints[joint.index()]
    }

    /// Average position over the subset of `joints` that are resolved.
    pub fn average_position(&self, joints: &[HandJoint]) -> Option<Vec3> {
        let mut sum = Vec3::ZERO;
        let mut count = 0u32;
        for joint in joints {
            if let Some(p) = self.position(*joint) {
                sum += p;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(sum / count as f32)
        }
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_count() {
        assert_eq!(HandJoint::Palm.index(), 0);
        assert_eq!(HandJoint::LittleTip.index(), 25);
        assert_eq!(JOINT_COUNT, 26);
    }

    #[test]
    fn test_joint_names_round_trip() {
        for i in 0..JOINT_COUNT {
            // Walk every joint through as_str -> from_name.
            let joint = match i {
                0 => HandJoint::Palm,
                1 => HandJoint::Wrist,
                2 => HandJoint::ThumbMetacarpal,
                3 => HandJoint::ThumbProximal,
                4 => HandJoint::ThumbDistal,
                5 => HandJoint::ThumbTip,
                6 => HandJoint::IndexMetacarpal,
                7 => HandJoint::IndexProximal,
                8 => HandJoint::IndexIntermediate,
                9 => HandJoint::IndexDistal,
                10 => HandJoint::IndexTip,
                11 => HandJoint::MiddleMetacarpal,
                12 => HandJoint::MiddleProximal,
                13 => HandJoint::MiddleIntermediate,
                14 => HandJoint::MiddleDistal,
                15 => HandJoint::MiddleTip,
                16 => HandJoint::RingMetacarpal,
                17 => HandJoint::RingProximal,
                18 => HandJoint::RingIntermediate,
                19 => HandJoint::RingDistal,
                20 => HandJoint::RingTip,
                21 => HandJoint::LittleMetacarpal,
                22 => HandJoint::LittleProximal,
                23 => HandJoint::LittleIntermediate,
                24 => HandJoint::LittleDistal,
                25 => HandJoint::LittleTip,
                _ => unreachable!(),
            };
            assert_eq!(joint.index(), i);
            assert_eq!(HandJoint::from_name(joint.as_str()), Some(joint));
        }
        assert_eq!(HandJoint::from_name("elbow"), None);
    }

    #[test]
    fn test_hand_as_str() {
        assert_eq!(Hand::Left.as_str(), "left");
        assert_eq!(Hand::Right.as_str(), "right");
        assert_eq!(Hand::from_name("left"), Some(Hand::Left));
        assert_eq!(Hand::from_name("both"), None);
    }

    #[test]
    fn test_hidden_snapshot_has_no_joints() {
        let mut snapshot = HandSnapshot::hidden();
        snapshot.set(HandJoint::Wrist, Vec3::new(1.0, 2.0, 3.0));
        // Invisible hands never report positions, even if one was set.
        assert_eq!(snapshot.position(HandJoint::Wrist), None);
    }

    #[test]
    fn test_set_and_get() {
        let mut snapshot = HandSnapshot::visible();
        assert_eq!(snapshot.position(HandJoint::IndexTip), None);
        snapshot.set(HandJoint::IndexTip, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(
            snapshot.position(HandJoint::IndexTip),
            Some(Vec3::new(0.1, 0.2, 0.3)),
        );
    }

    #[test]
    fn test_from_named_positions_skips_unknown() {
        let snapshot = HandSnapshot::from_named_positions(vec![
            ("wrist", [0.0, 0.0, 0.0]),
            ("index-tip", [0.1, 0.0, 0.0]),
            ("antenna", [9.9, 9.9, 9.9]),
        ]);
        assert!(snapshot.visible);
        assert_eq!(snapshot.position(HandJoint::Wrist), Some(Vec3::ZERO));
        assert_eq!(
            snapshot.position(HandJoint::IndexTip),
            Some(Vec3::new(0.1, 0.0, 0.0)),
        );
        assert_eq!(snapshot.position(HandJoint::ThumbTip), None);
    }

    #[test]
    fn test_average_position() {
        let mut snapshot = HandSnapshot::visible();
        snapshot.set(HandJoint::IndexTip, Vec3::new(1.0, 0.0, 0.0));
        snapshot.set(HandJoint::MiddleTip, Vec3::new(3.0, 0.0, 0.0));
        // RingTip and LittleTip missing: excluded from the average.
        let avg = snapshot
            .average_position(&HandJoint::grip_fingertips())
            .unwrap();
        assert!((avg - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);

        let empty = HandSnapshot::visible();
        assert_eq!(empty.average_position(&HandJoint::grip_fingertips()), None);
    }

    #[test]
    fn test_grip_fingertips_excludes_thumb() {
        let grips = HandJoint::grip_fingertips();
        assert_eq!(grips.len(), 4);
        assert!(!grips.contains(&HandJoint::ThumbTip));
        assert!(grips.contains(&HandJoint::IndexTip));
    }
}
