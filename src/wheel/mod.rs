//! Wheel geometry
//!
//! Pure functions only. The renderer, the spin engine and the context
//! menu hit-test all go through these, so they agree on which segment
//! sits under any given angle.

pub mod resolver;
pub mod segment;

pub use resolver::{hit_test, pointer_offset, resolve, segment_at_offset};
pub use segment::{Segment, segments, segments_from};
