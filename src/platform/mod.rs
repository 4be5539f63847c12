//! Platform abstraction layer
//!
//! Handles the host side of animation:
//! - Frame handles (one outstanding request per animation owner)
//! - Frame timestamps (a simulated clock for headless runs and tests)

pub mod frame;

pub use frame::{FrameHandle, FrameRequests, SimulatedClock};
