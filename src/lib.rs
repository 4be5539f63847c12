//! Name Roulette - a weighted wheel for picking who goes next
//!
//! Core modules:
//! - `roster`: Participant keys parsed from raw input
//! - `weights`: Per-participant weighting (halve, double, exclude, restore)
//! - `wheel`: Segment geometry and pointer resolution
//! - `spin`: Spin/drag/inertia state machine driven by a frame clock
//! - `session`: Round flow (exclusion prompt, challenge, interruption)
//! - `tuning`: Data-driven timing and probability constants
//! - `platform`: Frame clock used to drive animations
//! - `persistence`: Shareable session snapshot
//! - `random`, `audio`: Injected randomness and sound cue sinks

pub mod audio;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod random;
pub mod roster;
pub mod session;
pub mod spin;
pub mod tuning;
pub mod weights;
pub mod wheel;

pub use error::RouletteError;
pub use roster::Roster;
pub use session::Session;
pub use spin::{SpinEngine, SpinPhase};
pub use tuning::Tuning;
pub use weights::WeightStore;

use glam::DVec2;

/// Wheel configuration constants
pub mod consts {
    /// Degrees in a full turn
    pub const FULL_TURN: f64 = 360.0;
    /// Where the first segment starts (top of the wheel, screen degrees)
    pub const REFERENCE_ANGLE: f64 = -90.0;
    /// Where the pointer sits (top of the wheel, screen degrees)
    pub const POINTER_ANGLE: f64 = -90.0;
    /// A spin needs at least this many participants
    pub const MIN_PARTICIPANTS: usize = 2;
    /// Honorific appended to display names and stripped from keys
    pub const HONORIFIC_SUFFIX: &str = "さん";
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(consts::FULL_TURN);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= consts::FULL_TURN { 0.0 } else { wrapped }
}

/// Convert polar (r, degrees) to cartesian (x, y) in screen space
#[inline]
pub fn polar_to_cartesian(r: f64, degrees: f64) -> DVec2 {
    let theta = degrees.to_radians();
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) in screen space to polar (r, degrees)
#[inline]
pub fn cartesian_to_polar(pos: DVec2) -> (f64, f64) {
    (pos.length(), pos.y.atan2(pos.x).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        let tiny = normalize_degrees(-1e-14);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_polar_round_trip() {
        let p = polar_to_cartesian(100.0, -90.0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y + 100.0).abs() < 1e-9);
        let (r, deg) = cartesian_to_polar(p);
        assert!((r - 100.0).abs() < 1e-9);
        assert!((deg + 90.0).abs() < 1e-9);
    }
}
