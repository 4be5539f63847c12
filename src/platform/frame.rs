//! Animation frame plumbing
//!
//! A browser hands out `requestAnimationFrame` ids; here the animation
//! owner hands out its own [`FrameHandle`]s and the host echoes the handle
//! back with each timestamp. A handle that is no longer outstanding is
//! stale and its frame is dropped, so a cancelled loop can never touch
//! state again.

use serde::{Deserialize, Serialize};

/// Identifies one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// At most one outstanding frame request
#[derive(Debug, Clone, Default)]
pub struct FrameRequests {
    next_id: u64,
    outstanding: Option<FrameHandle>,
}

impl FrameRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a new frame, cancelling any previous request
    pub fn request(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        if let Some(old) = self.outstanding.replace(handle) {
            log::trace!("Frame {} superseded by {}", old.id(), handle.id());
        }
        handle
    }

    /// Cancel the outstanding request, if any
    pub fn cancel(&mut self) -> Option<FrameHandle> {
        self.outstanding.take()
    }

    /// Take the handle for delivery; false if it is stale
    pub fn take_if_current(&mut self, handle: FrameHandle) -> bool {
        if self.outstanding == Some(handle) {
            self.outstanding = None;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn outstanding(&self) -> Option<FrameHandle> {
        self.outstanding
    }
}

/// Monotonic frame clock for headless runs
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    now_ms: f64,
    step_ms: f64,
}

impl SimulatedClock {
    /// Clock ticking at `fps` frames per second, starting at `start_ms`
    pub fn new(start_ms: f64, fps: f64) -> Self {
        Self {
            now_ms: start_ms,
            step_ms: 1000.0 / fps.max(1.0),
        }
    }

    /// 60 Hz display refresh
    pub fn display() -> Self {
        Self::new(0.0, 60.0)
    }

    #[inline]
    pub fn now(&self) -> f64 {
        self.now_ms
    }

    /// Advance one frame and return the new timestamp
    pub fn tick(&mut self) -> f64 {
        self.now_ms += self.step_ms;
        self.now_ms
    }

    /// Jump ahead (e.g. while a dialog is open)
    pub fn advance(&mut self, ms: f64) -> f64 {
        self.now_ms += ms.max(0.0);
        self.now_ms
    }
}
