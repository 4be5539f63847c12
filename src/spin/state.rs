//! Spin state types
//!
//! Phases, results and events of the spin engine, plus the wheel layout
//! an animation resolves against.

use serde::{Deserialize, Serialize};

use crate::consts::MIN_PARTICIPANTS;
use crate::error::RouletteError;
use crate::roster::normalize_key;
use crate::wheel::{Segment, segments_from};

/// Current phase of the wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpinPhase {
    /// At rest, no result
    #[default]
    Idle,
    /// Autonomous spin animation running
    Spinning,
    /// User is turning the wheel by hand
    Dragging,
    /// Inertia after a drag release
    Settling,
    /// At rest with a result
    Resolved,
}

impl SpinPhase {
    /// Whether the wheel is in motion (no new spin may start)
    #[inline]
    pub fn is_moving(&self) -> bool {
        matches!(self, SpinPhase::Spinning | SpinPhase::Dragging | SpinPhase::Settling)
    }
}

/// Which way to move the result when shifting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftDirection {
    Previous,
    Next,
}

impl ShiftDirection {
    #[inline]
    pub fn step(&self) -> i64 {
        match self {
            ShiftDirection::Previous => -1,
            ShiftDirection::Next => 1,
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            ShiftDirection::Previous => ShiftDirection::Next,
            ShiftDirection::Next => ShiftDirection::Previous,
        }
    }
}

/// The participant under the pointer once the wheel stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub index: usize,
    pub key: String,
}

/// Things the host may want to react to (sounds, result display)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpinEvent {
    /// A different segment is now under the pointer
    SegmentCrossed { index: usize },
    /// The wheel stopped and a winner was picked
    Resolved(Resolution),
    /// The result was moved to a neighbour without animating
    Shifted(Resolution),
    /// An animation failed mid-flight and was stopped
    Aborted,
}

/// Participants and weights an animation resolves against
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    items: Vec<String>,
    segments: Vec<Segment>,
}

impl Layout {
    /// Build a spinnable layout. An empty weight slice means equal weights.
    pub fn new(items: &[String], weights: &[f64], reference: f64) -> Result<Self, RouletteError> {
        if items.len() < MIN_PARTICIPANTS {
            return Err(RouletteError::TooFewParticipants {
                have: items.len(),
                min: MIN_PARTICIPANTS,
            });
        }
        let weights = if weights.is_empty() {
            vec![1.0; items.len()]
        } else {
            weights.to_vec()
        };
        if weights.len() != items.len() {
            return Err(RouletteError::LayoutMismatch {
                items: items.len(),
                weights: weights.len(),
            });
        }
        let segments = segments_from(&weights, reference);
        if segments.is_empty() {
            return Err(RouletteError::AllExcluded);
        }
        Ok(Self {
            items: items.iter().map(|i| normalize_key(i)).collect(),
            segments,
        })
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        let key = normalize_key(key);
        self.items.iter().position(|i| *i == key)
    }

    pub fn resolution(&self, index: usize) -> Option<Resolution> {
        self.items.get(index).map(|key| Resolution {
            index,
            key: key.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_layout_defaults_to_equal_weights() {
        let layout = Layout::new(&names(&["A", "B", "C"]), &[], -90.0).unwrap();
        assert_eq!(layout.segments().len(), 3);
        for segment in layout.segments() {
            assert!((segment.sweep - 120.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_layout_rejects_bad_input() {
        assert!(matches!(
            Layout::new(&names(&["A"]), &[], -90.0),
            Err(RouletteError::TooFewParticipants { have: 1, .. })
        ));
        assert!(matches!(
            Layout::new(&names(&["A", "B"]), &[1.0], -90.0),
            Err(RouletteError::LayoutMismatch { .. })
        ));
        assert_eq!(
            Layout::new(&names(&["A", "B"]), &[0.0, 0.0], -90.0),
            Err(RouletteError::AllExcluded)
        );
    }

    #[test]
    fn test_layout_keys_strip_honorific() {
        let layout = Layout::new(&names(&["Aさん", "B"]), &[], -90.0).unwrap();
        assert_eq!(layout.position("A"), Some(0));
        assert_eq!(layout.resolution(1).unwrap().key, "B");
    }

    #[test]
    fn test_phase_motion() {
        assert!(!SpinPhase::Idle.is_moving());
        assert!(SpinPhase::Settling.is_moving());
        assert!(!SpinPhase::Resolved.is_moving());
        assert_eq!(ShiftDirection::Next.reversed(), ShiftDirection::Previous);
    }
}
