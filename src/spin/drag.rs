//! Release velocity estimation for hand drags

use std::collections::VecDeque;

use crate::tuning::SpinTuning;

/// One pointer movement while dragging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    /// Rotation change (degrees)
    pub delta: f64,
    /// Host timestamp (ms)
    pub time: f64,
}

/// Rolling window of recent drag samples
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: VecDeque<DragSample>,
    window_ms: f64,
    frame_ms: f64,
}

impl VelocityTracker {
    pub fn new(tuning: &SpinTuning) -> Self {
        Self {
            samples: VecDeque::new(),
            window_ms: tuning.velocity_window_ms,
            frame_ms: tuning.velocity_frame_ms,
        }
    }

    /// Record a sample and forget anything older than the window
    pub fn record(&mut self, delta: f64, time: f64) {
        self.samples.push_back(DragSample { delta, time });
        self.prune(time);
    }

    fn prune(&mut self, now: f64) {
        let window = self.window_ms;
        self.samples.retain(|s| now - s.time < window);
    }

    /// Velocity in degrees per frame unit at release time `now`.
    ///
    /// Needs at least two samples spanning some time, otherwise the wheel
    /// was not really moving and the velocity is zero.
    pub fn release_velocity(&mut self, now: f64) -> f64 {
        self.prune(now);
        let (Some(first), Some(last)) = (self.samples.front(), self.samples.back()) else {
            return 0.0;
        };
        let span = last.time - first.time;
        if self.samples.len() < 2 || span <= 0.0 {
            return 0.0;
        }
        let total: f64 = self.samples.iter().map(|s| s.delta).sum();
        total / span * self.frame_ms
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
