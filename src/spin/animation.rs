//! Eased rotation animations

use super::state::Layout;

/// Ease-out quintic: fast start, velocity falls smoothly to zero.
/// Exactly 1.0 at `progress == 1.0`.
#[inline]
pub fn ease_out_quint(progress: f64) -> f64 {
    1.0 - (1.0 - progress).powi(5)
}

/// What started an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    /// Full random spin
    Spin,
    /// Short spin after an interruption
    Nudge,
    /// Coasting after a drag release
    Inertia,
}

/// A rotation from `start_rotation` to `start_rotation + total`
#[derive(Debug, Clone)]
pub struct Animation {
    pub kind: AnimationKind,
    pub layout: Layout,
    pub start_rotation: f64,
    pub total: f64,
    pub duration_ms: f64,
    /// Timestamp of the first frame; fixed lazily
    pub started_at: Option<f64>,
}

impl Animation {
    pub fn new(
        kind: AnimationKind,
        layout: Layout,
        start_rotation: f64,
        total: f64,
        duration_ms: f64,
    ) -> Self {
        Self {
            kind,
            layout,
            start_rotation,
            total,
            duration_ms,
            started_at: None,
        }
    }

    /// Where the wheel lands
    #[inline]
    pub fn target(&self) -> f64 {
        self.start_rotation + self.total
    }

    /// Rotation at `timestamp`, and whether the animation is finished.
    ///
    /// The last frame returns the exact target rather than an eased value,
    /// so the resolved angle never drifts.
    pub fn sample(&mut self, timestamp: f64) -> (f64, bool) {
        let started = *self.started_at.get_or_insert(timestamp);
        let progress = if self.duration_ms > 0.0 {
            ((timestamp - started) / self.duration_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if progress >= 1.0 {
            (self.target(), true)
        } else {
            (self.start_rotation + self.total * ease_out_quint(progress), false)
        }
    }
}
