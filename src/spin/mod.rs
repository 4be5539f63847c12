//! Spin engine module
//!
//! The wheel's motion lives here. Like the rest of the core it must stay
//! deterministic:
//! - Randomness only through an injected `RandomSource`
//! - Time only through frame timestamps handed in by the host
//! - One outstanding frame request at a time

pub mod animation;
pub mod drag;
pub mod engine;
pub mod state;

pub use animation::{Animation, AnimationKind, ease_out_quint};
pub use drag::{DragSample, VelocityTracker};
pub use engine::{DragRelease, Inertia, SpinEngine};
pub use state::{Layout, Resolution, ShiftDirection, SpinEvent, SpinPhase};
