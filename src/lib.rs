//! Hand-gesture interaction core for real-time 3D interfaces.
//!
//! Turns raw tracked hand-joint positions into discrete semantic gestures
//! (pinch, grab, open-hand) and drives on-screen controls from them:
//!
//! - [`gesture::HandGestureTracker`]: per-hand joint snapshot to
//!   [`gesture::GestureState`] plus edge-triggered events on an
//!   [`events::EventBus`]
//! - [`manipulation::ManipulationArbiter`]: bimanual grab and rigid
//!   transform of one target, with a scene-wide [`manipulation::GrabLock`]
//! - [`button::ContactSurfaceButton`] / [`button::ToggleButton`]:
//!   contact-point press simulation with latched activation
//! - [`slider::LinearDragControl`]: bounded 1-D value via single-hand
//!   pinch drag
//! - [`rotary::RotaryDragControl`]: wrapped angular selection among N
//!   discrete options
//!
//! Everything is single-threaded and frame-driven: the host render loop
//! calls one `update` per control per frame. Both hands' gesture states
//! must be recomputed for the current tick before any control consumes
//! them, so consumers never mix this tick's pinch with last tick's grab.
//! Invalid or partial input (untracked hand, missing joint, degenerate
//! geometry) is absorbed by fallback branches; per-frame updates never
//! fail. This crate renders nothing and performs no I/O.

pub mod button;
pub mod error;
pub mod events;
pub mod gesture;
pub mod hand;
pub mod manipulation;
pub mod math;
pub mod rotary;
pub mod slider;

pub use button::{ButtonConfig, ContactSurfaceButton, PressResult, ToggleButton};
pub use error::ConfigError;
pub use events::{EventBus, GestureEvent, GestureTopic, Subscription};
pub use gesture::{GestureConfig, GestureState, HandGestureTracker, PinchState};
pub use hand::{Hand, HandJoint, HandSnapshot, JOINT_COUNT};
pub use manipulation::{
    GrabLock, ManipulableTarget, ManipulationArbiter, ManipulationConfig,
    ManipulationPhase, ManipulationResult,
};
pub use math::{BoxBounds, Pose};
pub use rotary::{RotaryConfig, RotaryDragControl, RotaryResult};
pub use slider::{LinearDragControl, SliderConfig, SliderResult};
