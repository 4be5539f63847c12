//! Segment geometry for the wheel
//!
//! A segment is the angular slice one participant owns:
//! - start: screen angle in degrees where the slice begins
//! - sweep: angular extent, proportional to the participant's weight
//!
//! Segments are contiguous, ordered by participant index, and always add
//! up to a full turn.

use serde::{Deserialize, Serialize};

use crate::consts::{FULL_TURN, MIN_PARTICIPANTS, REFERENCE_ANGLE};

/// One participant's slice of the wheel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start angle (degrees, screen space)
    pub start: f64,
    /// Angular extent (degrees)
    pub sweep: f64,
    /// Start angle of the first segment
    pub reference: f64,
}

impl Segment {
    /// End angle of the slice
    #[inline]
    pub fn end(&self) -> f64 {
        self.start + self.sweep
    }

    /// Angle through the middle of the slice (label placement, shift target)
    #[inline]
    pub fn mid(&self) -> f64 {
        self.start + self.sweep / 2.0
    }

    /// Start relative to the first segment, in [0, 360]
    #[inline]
    pub fn offset(&self) -> f64 {
        self.start - self.reference
    }

    /// Half-open containment: the start boundary belongs to this slice
    pub fn contains_offset(&self, offset: f64) -> bool {
        offset >= self.offset() && offset < self.offset() + self.sweep
    }

    /// Excluded participants own no arc
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sweep <= 0.0
    }
}

/// Partition the wheel for a weight vector, starting at the top
pub fn segments(weights: &[f64]) -> Vec<Segment> {
    segments_from(weights, REFERENCE_ANGLE)
}

/// Partition the wheel for a weight vector, starting at `reference`.
///
/// Returns an empty model when there are fewer than two weights, when any
/// weight is negative or non-finite, or when nothing has positive weight.
pub fn segments_from(weights: &[f64], reference: f64) -> Vec<Segment> {
    if weights.len() < MIN_PARTICIPANTS {
        return Vec::new();
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        log::warn!("Refusing to segment invalid weights {:?}", weights);
        return Vec::new();
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Vec::new();
    }

    let mut sweeps: Vec<f64> = weights.iter().map(|w| FULL_TURN * w / total).collect();

    // Fold rounding error into the last slice that owns any arc, so the
    // sum is exactly a full turn and excluded slices stay at zero
    if let Some(last) = sweeps.iter().rposition(|s| *s > 0.0) {
        let others: f64 = sweeps
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != last)
            .map(|(_, s)| s)
            .sum();
        sweeps[last] = FULL_TURN - others;
    }

    let mut start = reference;
    sweeps
        .into_iter()
        .map(|sweep| {
            let segment = Segment {
                start,
                sweep,
                reference,
            };
            start += sweep;
            segment
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equal_weights() {
        let segs = segments(&[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(segs.len(), 4);
        assert_eq!(segs[0].start, -90.0);
        for (i, s) in segs.iter().enumerate() {
            assert!((s.sweep - 90.0).abs() < 1e-9);
            assert!((s.offset() - 90.0 * i as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_weighted_sweeps_are_proportional() {
        let segs = segments(&[2.0, 1.0, 1.0]);
        assert!((segs[0].sweep - 180.0).abs() < 1e-9);
        assert!((segs[1].start - 90.0).abs() < 1e-9);
        assert!((segs[2].end() - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_excluded_segment_has_no_arc() {
        let segs = segments(&[1.0, 0.0, 1.0]);
        assert!(segs[1].is_empty());
        assert_eq!(segs[1].start, segs[2].start);
    }

    #[test]
    fn test_degenerate_inputs_are_empty() {
        assert!(segments(&[]).is_empty());
        assert!(segments(&[1.0]).is_empty());
        assert!(segments(&[0.0, 0.0]).is_empty());
        assert!(segments(&[1.0, f64::NAN]).is_empty());
        assert!(segments(&[1.0, -1.0]).is_empty());
    }

    #[test]
    fn test_contains_offset_is_half_open() {
        let segs = segments(&[1.0, 1.0]);
        assert!(segs[0].contains_offset(0.0));
        assert!(!segs[0].contains_offset(180.0));
        assert!(segs[1].contains_offset(180.0));
    }

    proptest! {
        #[test]
        fn prop_sweeps_sum_to_full_turn(
            weights in prop::collection::vec(0.0f64..1000.0, 2..40)
        ) {
            prop_assume!(weights.iter().sum::<f64>() > 0.0);
            let segs = segments(&weights);
            prop_assert_eq!(segs.len(), weights.len());
            let total: f64 = segs.iter().map(|s| s.sweep).sum();
            prop_assert!((total - FULL_TURN).abs() < 1e-9);
            for pair in segs.windows(2) {
                prop_assert!((pair[0].end() - pair[1].start).abs() < 1e-9);
            }
            for (s, w) in segs.iter().zip(&weights) {
                if *w == 0.0 {
                    prop_assert_eq!(s.sweep, 0.0);
                }
            }
        }
    }
}
