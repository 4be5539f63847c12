//! Pointer resolution
//!
//! Maps a rotation (or a click position) to the participant index under
//! it. Boundaries belong to the segment that starts there.

use glam::DVec2;

use super::segment::Segment;
use crate::{cartesian_to_polar, normalize_degrees};

/// Angle under the pointer, measured from the start of the first segment.
///
/// Rotating the wheel by `r` moves every slice by `r`, so the pointer at
/// `pointer_angle` reads the slice offset `pointer - reference - r`.
#[inline]
pub fn pointer_offset(rotation: f64, reference: f64, pointer_angle: f64) -> f64 {
    normalize_degrees(pointer_angle - reference - rotation)
}

/// Index of the segment owning `offset` (degrees from the first start).
///
/// Accumulation can leave a sliver past the last boundary; that falls back
/// to the last segment with any arc so an excluded tail is never picked.
pub fn segment_at_offset(segments: &[Segment], offset: f64) -> Option<usize> {
    let mut accumulated = 0.0;
    for (i, segment) in segments.iter().enumerate() {
        accumulated += segment.sweep;
        if offset < accumulated && !segment.is_empty() {
            return Some(i);
        }
    }
    segments.iter().rposition(|s| !s.is_empty())
}

/// Winner for a final rotation
pub fn resolve(segments: &[Segment], rotation: f64, pointer_angle: f64) -> Option<usize> {
    let reference = segments.first()?.reference;
    segment_at_offset(segments, pointer_offset(rotation, reference, pointer_angle))
}

/// Segment under a screen point (context menu picks).
///
/// `point` and `center` are screen coordinates (y down). Returns `None`
/// outside `radius` or for an empty model.
pub fn hit_test(
    segments: &[Segment],
    point: DVec2,
    center: DVec2,
    radius: f64,
    rotation: f64,
) -> Option<usize> {
    let reference = segments.first()?.reference;
    let (r, angle) = cartesian_to_polar(point - center);
    if r > radius {
        return None;
    }
    // The click angle plays the role of the pointer
    segment_at_offset(segments, pointer_offset(rotation, reference, angle))
}
