//! Spin engine
//!
//! Owns the wheel rotation and the spin lifecycle:
//!
//! ```text
//! Idle/Resolved --spin--> Spinning --done--> Resolved
//! any --drag_start--> Dragging --drag_end--> Settling --done--> Resolved
//!                                          \-(slow release)--> Resolved
//! Resolved --shift_result--> Resolved
//! any --reset--> Idle
//! ```
//!
//! The engine is driven by frames: while an animation runs it keeps one
//! outstanding [`FrameHandle`], and the host calls [`SpinEngine::on_frame`]
//! with that handle and the display timestamp.

use super::animation::{Animation, AnimationKind};
use super::drag::VelocityTracker;
use super::state::{Layout, Resolution, ShiftDirection, SpinEvent, SpinPhase};
use crate::consts::FULL_TURN;
use crate::error::RouletteError;
use crate::platform::{FrameHandle, FrameRequests};
use crate::random::RandomSource;
use crate::tuning::{SpinTuning, WheelTuning};
use crate::wheel::{Segment, resolve};

/// Outcome of releasing a drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragRelease {
    /// Release velocity (degrees per frame unit)
    pub velocity: f64,
    /// Coasting animation, if the release was fast enough
    pub inertia: Option<Inertia>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inertia {
    pub total: f64,
    pub duration_ms: f64,
}

/// Rotation recorded when a result was resolved; shifting back to that
/// index restores it exactly
#[derive(Debug, Clone, Copy, PartialEq)]
struct ShiftAnchor {
    index: usize,
    rotation: f64,
}

pub struct SpinEngine {
    tuning: SpinTuning,
    wheel: WheelTuning,
    rng: Box<dyn RandomSource>,
    phase: SpinPhase,
    /// Unbounded; accumulates across spins and drags
    rotation: f64,
    result: Option<Resolution>,
    frames: FrameRequests,
    animation: Option<Animation>,
    last_frame_ms: Option<f64>,
    /// Resolution owed by an animation that a drag interrupted
    pending: Option<Layout>,
    drag: VelocityTracker,
    drag_layout: Option<Layout>,
    anchor: Option<ShiftAnchor>,
    pointer_index: Option<usize>,
    events: Vec<SpinEvent>,
}

impl SpinEngine {
    pub fn new(tuning: SpinTuning, wheel: WheelTuning, rng: Box<dyn RandomSource>) -> Self {
        let drag = VelocityTracker::new(&tuning);
        Self {
            tuning,
            wheel,
            rng,
            phase: SpinPhase::Idle,
            rotation: 0.0,
            result: None,
            frames: FrameRequests::new(),
            animation: None,
            last_frame_ms: None,
            pending: None,
            drag,
            drag_layout: None,
            anchor: None,
            pointer_index: None,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    #[inline]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.phase.is_moving()
    }

    /// Winning participant key, if resolved
    pub fn result(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.key.as_str())
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.result.as_ref()
    }

    /// The frame the host should deliver next, if any
    #[inline]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.frames.outstanding()
    }

    /// Landing angle of the running animation
    pub fn target_rotation(&self) -> Option<f64> {
        self.animation.as_ref().map(Animation::target)
    }

    /// Duration of the running animation (ms)
    pub fn animation_duration(&self) -> Option<f64> {
        self.animation.as_ref().map(|a| a.duration_ms)
    }

    pub fn drain_events(&mut self) -> Vec<SpinEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a full random spin. Returns false (and changes nothing) when
    /// already in motion or when the layout cannot be spun.
    pub fn spin(&mut self, items: &[String], weights: &[f64]) -> bool {
        self.start_spin(items, weights, AnimationKind::Spin)
    }

    /// Start a short, weak spin (used after an interruption)
    pub fn nudge(&mut self, items: &[String], weights: &[f64]) -> bool {
        self.start_spin(items, weights, AnimationKind::Nudge)
    }

    fn start_spin(&mut self, items: &[String], weights: &[f64], kind: AnimationKind) -> bool {
        if self.phase.is_moving() {
            log::debug!("Spin ignored while {:?}", self.phase);
            return false;
        }
        let layout = match Layout::new(items, weights, self.wheel.reference_angle) {
            Ok(layout) => layout,
            Err(e) => {
                log::debug!("Spin refused: {}", e);
                return false;
            }
        };

        let (turns, duration) = match kind {
            AnimationKind::Nudge => (self.tuning.nudge_turns, self.tuning.nudge_duration_ms),
            _ => (self.tuning.spin_turns, self.tuning.spin_duration_ms),
        };
        let turns = turns.sample(self.rng.next_unit());
        let extra = self.rng.next_unit() * self.tuning.extra_offset_deg;
        let duration_ms = duration.sample(self.rng.next_unit());
        let total = turns * FULL_TURN + extra;

        log::info!(
            "{:?}: {:.1} degrees over {:.0} ms across {} participants",
            kind,
            total,
            duration_ms,
            layout.len()
        );

        self.result = None;
        self.anchor = None;
        self.pending = None;
        self.pointer_index = self.index_under_pointer(layout.segments());
        self.begin(Animation::new(kind, layout, self.rotation, total, duration_ms));
        self.phase = SpinPhase::Spinning;
        true
    }

    fn begin(&mut self, animation: Animation) {
        self.animation = Some(animation);
        self.frames.request();
    }

    /// Drop the running animation and its frame request
    fn cancel_animation(&mut self) -> Option<Animation> {
        self.frames.cancel();
        self.animation.take()
    }

    /// Deliver an animation frame. Stale handles are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp_ms: f64) {
        if !self.frames.take_if_current(handle) {
            log::trace!("Dropping stale frame {}", handle.id());
            return;
        }
        if let Err(e) = self.step(timestamp_ms) {
            log::error!("Animation aborted: {}", e);
            self.abort();
        }
    }

    fn step(&mut self, timestamp_ms: f64) -> Result<(), RouletteError> {
        if !timestamp_ms.is_finite() {
            return Err(RouletteError::NonFinite {
                what: "frame timestamp",
                value: timestamp_ms,
            });
        }
        let timestamp = match self.last_frame_ms {
            Some(last) if timestamp_ms < last => {
                log::debug!("Frame time went backwards ({} < {})", timestamp_ms, last);
                last
            }
            _ => timestamp_ms,
        };
        self.last_frame_ms = Some(timestamp);

        let Some(animation) = self.animation.as_mut() else {
            return Ok(());
        };
        let (rotation, done) = animation.sample(timestamp);
        if !rotation.is_finite() {
            return Err(RouletteError::NonFinite {
                what: "rotation",
                value: rotation,
            });
        }
        let index = resolve(animation.layout.segments(), rotation, self.wheel.pointer_angle);
        self.rotation = rotation;
        self.track_pointer(index);

        if done {
            if let Some(animation) = self.animation.take() {
                self.finish(animation);
            }
        } else {
            self.frames.request();
        }
        Ok(())
    }

    fn finish(&mut self, animation: Animation) {
        // Resolve on the exact landing angle, not a re-sampled one
        self.rotation = animation.target();
        log::debug!("{:?} finished at {:.3}", animation.kind, self.rotation);
        self.resolve_with(&animation.layout);
    }

    /// Abort the running animation and land on resolved-or-idle
    fn abort(&mut self) {
        let layout = self
            .cancel_animation()
            .map(|a| a.layout)
            .or_else(|| self.pending.take());
        self.events.push(SpinEvent::Aborted);
        match layout {
            Some(layout) => self.resolve_with(&layout),
            None => self.phase = SpinPhase::Idle,
        }
    }

    fn resolve_with(&mut self, layout: &Layout) {
        let winner = resolve(layout.segments(), self.rotation, self.wheel.pointer_angle)
            .and_then(|index| layout.resolution(index));
        match winner {
            Some(resolution) => {
                log::info!("Resolved: {} (index {})", resolution.key, resolution.index);
                self.anchor = Some(ShiftAnchor {
                    index: resolution.index,
                    rotation: self.rotation,
                });
                self.pointer_index = Some(resolution.index);
                self.events.push(SpinEvent::Resolved(resolution.clone()));
                self.result = Some(resolution);
                self.phase = SpinPhase::Resolved;
            }
            None => {
                log::warn!("Nothing to resolve at rotation {:.3}", self.rotation);
                self.result = None;
                self.phase = SpinPhase::Idle;
            }
        }
    }

    fn index_under_pointer(&self, segments: &[Segment]) -> Option<usize> {
        resolve(segments, self.rotation, self.wheel.pointer_angle)
    }

    fn track_pointer(&mut self, index: Option<usize>) {
        if let (Some(previous), Some(current)) = (self.pointer_index, index) {
            if previous != current {
                self.events.push(SpinEvent::SegmentCrossed { index: current });
            }
        }
        if index.is_some() {
            self.pointer_index = index;
        }
    }

    /// User grabbed the wheel. Cancels any animation; an interrupted
    /// spin still owes a result, which is resolved when the drag ends.
    pub fn drag_start(&mut self, items: &[String], weights: &[f64]) {
        if let Some(animation) = self.cancel_animation() {
            log::debug!("{:?} interrupted by drag", animation.kind);
            self.pending = Some(animation.layout);
        }
        self.result = None;
        self.anchor = None;
        self.drag.clear();
        self.drag_layout = Layout::new(items, weights, self.wheel.reference_angle).ok();
        self.pointer_index = self
            .drag_layout
            .as_ref()
            .and_then(|l| self.index_under_pointer(l.segments()));
        self.phase = SpinPhase::Dragging;
    }

    /// Pointer moved by `delta` degrees at `timestamp_ms`
    pub fn drag_delta(&mut self, delta: f64, timestamp_ms: f64) {
        if self.phase != SpinPhase::Dragging {
            return;
        }
        if !(delta.is_finite() && timestamp_ms.is_finite()) {
            log::warn!("Ignoring drag sample ({}, {})", delta, timestamp_ms);
            return;
        }
        self.rotation += delta;
        self.drag.record(delta, timestamp_ms);
        let index = self
            .pending
            .as_ref()
            .or(self.drag_layout.as_ref())
            .and_then(|l| self.index_under_pointer(l.segments()));
        self.track_pointer(index);
    }

    /// User let go. Fast releases coast with inertia, slow ones resolve
    /// where the wheel stands.
    pub fn drag_end(&mut self, items: &[String], weights: &[f64], timestamp_ms: f64) -> DragRelease {
        if self.phase != SpinPhase::Dragging {
            return DragRelease {
                velocity: 0.0,
                inertia: None,
            };
        }
        let velocity = if timestamp_ms.is_finite() {
            self.drag.release_velocity(timestamp_ms)
        } else {
            0.0
        };
        self.drag.clear();

        let drag_layout = self.drag_layout.take();
        let layout = self
            .pending
            .take()
            .or_else(|| Layout::new(items, weights, self.wheel.reference_angle).ok())
            .or(drag_layout);
        let Some(layout) = layout else {
            log::debug!("Drag released with nothing to resolve");
            self.phase = SpinPhase::Idle;
            return DragRelease {
                velocity,
                inertia: None,
            };
        };

        if velocity.abs() < self.tuning.inertia_threshold {
            log::debug!("Slow release ({:.3}), resolving in place", velocity);
            self.resolve_with(&layout);
            return DragRelease {
                velocity,
                inertia: None,
            };
        }

        let inertia = Inertia {
            total: velocity * self.tuning.inertia_rotation_factor,
            duration_ms: (velocity.abs() * self.tuning.inertia_duration_factor)
                .min(self.tuning.inertia_max_duration_ms),
        };
        log::debug!(
            "Release velocity {:.3}: coasting {:.1} degrees over {:.0} ms",
            velocity,
            inertia.total,
            inertia.duration_ms
        );
        self.begin(Animation::new(
            AnimationKind::Inertia,
            layout,
            self.rotation,
            inertia.total,
            inertia.duration_ms,
        ));
        self.phase = SpinPhase::Settling;
        DragRelease {
            velocity,
            inertia: Some(inertia),
        }
    }

    /// Back to idle: no result, no animation, no drag tracking.
    /// Rotation is kept.
    pub fn reset(&mut self) {
        self.cancel_animation();
        self.pending = None;
        self.drag.clear();
        self.drag_layout = None;
        self.anchor = None;
        self.result = None;
        self.phase = SpinPhase::Idle;
    }

    /// Put the wheel back at its initial angle (full session reset)
    pub fn reset_rotation(&mut self) {
        self.rotation = 0.0;
        self.pointer_index = None;
        self.last_frame_ms = None;
    }

    /// Move the result to the neighbouring participant without animating,
    /// turning the wheel so the new winner sits centred under the pointer.
    /// Returns false when there is nothing to shift.
    pub fn shift_result(&mut self, direction: ShiftDirection, items: &[String], weights: &[f64]) -> bool {
        if self.phase != SpinPhase::Resolved {
            return false;
        }
        let Some(current) = self.result.as_ref() else {
            return false;
        };
        let layout = match Layout::new(items, weights, self.wheel.reference_angle) {
            Ok(layout) => layout,
            Err(e) => {
                log::debug!("Shift refused: {}", e);
                return false;
            }
        };
        let Some(index) = layout.position(&current.key) else {
            return false;
        };

        let n = layout.len() as i64;
        let next = (index as i64 + direction.step()).rem_euclid(n) as usize;
        let Some(resolution) = layout.resolution(next) else {
            return false;
        };

        self.rotation = match self.anchor {
            Some(anchor) if anchor.index == next => anchor.rotation,
            _ => {
                // Centre the new winner under the pointer
                self.wheel.pointer_angle - layout.segments()[next].mid()
            }
        };
        log::info!("Result shifted {:?} to {}", direction, resolution.key);
        self.pointer_index = Some(next);
        self.events.push(SpinEvent::Shifted(resolution.clone()));
        self.result = Some(resolution);
        true
    }
}
