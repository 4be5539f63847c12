//! Data-driven tuning
//!
//! Every timing, probability and inertia constant the engine uses lives
//! here so it can be changed from a JSON file without touching the state
//! machines. Missing fields fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{POINTER_ANGLE, REFERENCE_ANGLE};
use crate::error::RouletteError;

/// Environment variable pointing at a tuning JSON file
pub const TUNING_ENV_VAR: &str = "NAME_ROULETTE_TUNING";

/// A randomized range: `min + r * spread` for `r` in [0, 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Jitter {
    pub min: f64,
    pub spread: f64,
}

impl Jitter {
    pub const fn new(min: f64, spread: f64) -> Self {
        Self { min, spread }
    }

    /// Sample the range with a unit random value
    #[inline]
    pub fn sample(&self, unit: f64) -> f64 {
        self.min + unit * self.spread
    }
}

/// Spin and drag physics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinTuning {
    /// Full turns for a regular spin
    pub spin_turns: Jitter,
    /// Duration of a regular spin (ms)
    pub spin_duration_ms: Jitter,
    /// Full turns for a nudge after an interruption
    pub nudge_turns: Jitter,
    /// Duration of a nudge (ms)
    pub nudge_duration_ms: Jitter,
    /// Extra random offset on top of the full turns (degrees)
    pub extra_offset_deg: f64,
    /// How far back drag samples count toward release velocity (ms)
    pub velocity_window_ms: f64,
    /// Velocity is expressed in degrees per this many ms
    pub velocity_frame_ms: f64,
    /// Below this release velocity there is no inertia
    pub inertia_threshold: f64,
    /// Inertia rotation = velocity * this
    pub inertia_rotation_factor: f64,
    /// Inertia duration = |velocity| * this (ms)
    pub inertia_duration_factor: f64,
    /// Upper bound on inertia duration (ms)
    pub inertia_max_duration_ms: f64,
}

impl Default for SpinTuning {
    fn default() -> Self {
        Self {
            spin_turns: Jitter::new(5.0, 3.0),
            spin_duration_ms: Jitter::new(6000.0, 2000.0),
            nudge_turns: Jitter::new(1.0, 1.0),
            nudge_duration_ms: Jitter::new(2000.0, 1000.0),
            extra_offset_deg: 360.0,
            velocity_window_ms: 100.0,
            velocity_frame_ms: 16.0,
            inertia_threshold: 0.5,
            inertia_rotation_factor: 60.0,
            inertia_duration_factor: 300.0,
            inertia_max_duration_ms: 7000.0,
        }
    }
}

/// Round flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    /// Chance that a resolved result gets interrupted
    pub interruption_probability: f64,
    /// Share of interruptions that are cats (the rest are ducks)
    pub cat_share: f64,
    /// How long the interruption overlay runs (ms)
    pub interruption_duration_ms: f64,
    /// Pause between a teardown and the follow-up re-spin (ms)
    pub respin_delay_ms: f64,
    /// Roster size at which the exclusion prompt kicks in
    pub exclusion_prompt_min_roster: usize,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            interruption_probability: 0.6,
            cat_share: 0.5,
            interruption_duration_ms: 2500.0,
            respin_delay_ms: 100.0,
            exclusion_prompt_min_roster: 3,
        }
    }
}

/// Wheel geometry conventions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelTuning {
    /// Screen angle where the first segment starts
    pub reference_angle: f64,
    /// Screen angle of the pointer
    pub pointer_angle: f64,
}

impl Default for WheelTuning {
    fn default() -> Self {
        Self {
            reference_angle: REFERENCE_ANGLE,
            pointer_angle: POINTER_ANGLE,
        }
    }
}

/// All tuning values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub spin: SpinTuning,
    pub session: SessionTuning,
    pub wheel: WheelTuning,
}

impl Tuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, RouletteError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, RouletteError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load from `NAME_ROULETTE_TUNING` if set, otherwise defaults
    pub fn load_or_default() -> Self {
        let Ok(path) = std::env::var(TUNING_ENV_VAR) else {
            log::info!("Using default tuning");
            return Self::default();
        };

        match Self::load(Path::new(&path)) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Invalid tuning file '{}': {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, RouletteError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the state machines cannot work with
    pub fn validate(&self) -> Result<(), RouletteError> {
        let s = &self.spin;
        let jitters = [
            ("spin_turns", s.spin_turns),
            ("spin_duration_ms", s.spin_duration_ms),
            ("nudge_turns", s.nudge_turns),
            ("nudge_duration_ms", s.nudge_duration_ms),
        ];
        for (name, jitter) in jitters {
            if !(jitter.min.is_finite() && jitter.spread.is_finite()) {
                return Err(invalid(format!("{name} must be finite")));
            }
            if jitter.min < 0.0 || jitter.spread < 0.0 {
                return Err(invalid(format!("{name} must be non-negative")));
            }
        }
        if s.spin_duration_ms.min <= 0.0 || s.nudge_duration_ms.min <= 0.0 {
            return Err(invalid("animation durations must be positive".into()));
        }

        let positive = [
            ("velocity_window_ms", s.velocity_window_ms),
            ("velocity_frame_ms", s.velocity_frame_ms),
            ("inertia_rotation_factor", s.inertia_rotation_factor),
            ("inertia_duration_factor", s.inertia_duration_factor),
            ("inertia_max_duration_ms", s.inertia_max_duration_ms),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !(s.inertia_threshold.is_finite() && s.inertia_threshold >= 0.0) {
            return Err(invalid("inertia_threshold must be non-negative".into()));
        }
        if !(s.extra_offset_deg.is_finite() && s.extra_offset_deg >= 0.0) {
            return Err(invalid("extra_offset_deg must be non-negative".into()));
        }

        let r = &self.session;
        for (name, p) in [
            ("interruption_probability", r.interruption_probability),
            ("cat_share", r.cat_share),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(format!("{name} must be in [0, 1], got {p}")));
            }
        }
        for (name, ms) in [
            ("respin_delay_ms", r.respin_delay_ms),
            ("interruption_duration_ms", r.interruption_duration_ms),
        ] {
            if !(ms.is_finite() && ms >= 0.0) {
                return Err(invalid(format!("{name} must be non-negative")));
            }
        }
        if r.exclusion_prompt_min_roster < 3 {
            // Excluding from a two-person wheel leaves nothing to spin
            return Err(invalid("exclusion_prompt_min_roster must be at least 3".into()));
        }

        let w = &self.wheel;
        if !(w.reference_angle.is_finite() && w.pointer_angle.is_finite()) {
            return Err(invalid("wheel angles must be finite".into()));
        }

        Ok(())
    }
}

fn invalid(msg: String) -> RouletteError {
    RouletteError::InvalidTuning(msg)
}
