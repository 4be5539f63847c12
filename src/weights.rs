//! Per-participant weights
//!
//! Weights are overrides on top of a default of 1. The store owns the
//! roster as well, so every vector it hands out is aligned to the
//! current participant order and reflects the mutation that produced it.

use std::collections::HashMap;

use crate::error::RouletteError;
use crate::roster::{Roster, normalize_key};

/// Weight of a participant with no override
pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Default)]
pub struct WeightStore {
    roster: Roster,
    overrides: HashMap<String, f64>,
}

impl WeightStore {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            overrides: HashMap::new(),
        }
    }

    #[inline]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Replace the roster, keeping overrides for keys that survive
    pub fn set_roster(&mut self, roster: Roster) {
        self.overrides.retain(|key, _| roster.contains(key));
        self.roster = roster;
    }

    pub fn set_with_honorific(&mut self, value: bool) {
        self.roster.set_with_honorific(value);
    }

    /// Replace every override at once
    pub fn set_weights<I, S>(&mut self, initial: I)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        self.overrides.clear();
        for (name, weight) in initial {
            let weight = sanitize(weight);
            self.overrides.insert(normalize_key(name.as_ref()), weight);
        }
    }

    /// Effective weight of a participant (default if absent)
    pub fn weight(&self, name: &str) -> f64 {
        self.overrides
            .get(&normalize_key(name))
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }

    /// Explicit override for a participant, `None` when at the default
    pub fn override_weight(&self, name: &str) -> Option<f64> {
        self.overrides.get(&normalize_key(name)).copied()
    }

    /// Put an override back exactly as it was (`None` clears it)
    pub fn set_override(&mut self, name: &str, weight: Option<f64>) {
        let key = normalize_key(name);
        match weight {
            Some(weight) => {
                self.overrides.insert(key, sanitize(weight));
            }
            None => {
                self.overrides.remove(&key);
            }
        }
    }

    /// Weight vector aligned to the current roster order
    pub fn weights(&self) -> Vec<f64> {
        self.roster
            .keys()
            .iter()
            .map(|k| self.overrides.get(k).copied().unwrap_or(DEFAULT_WEIGHT))
            .collect()
    }

    /// Halve a participant's weight and return the updated vector
    pub fn halve(&mut self, name: &str) -> Vec<f64> {
        let key = normalize_key(name);
        let weight = self.weight(&key) / 2.0;
        log::debug!("Weight of {:?} halved to {}", key, weight);
        self.overrides.insert(key, weight);
        self.weights()
    }

    pub fn double(&mut self, name: &str) {
        let key = normalize_key(name);
        let weight = self.weight(&key) * 2.0;
        log::debug!("Weight of {:?} doubled to {}", key, weight);
        self.overrides.insert(key, weight);
    }

    /// Exclude a participant (weight 0) and return the updated vector
    pub fn exclude(&mut self, name: &str) -> Vec<f64> {
        let key = normalize_key(name);
        log::debug!("{:?} excluded", key);
        self.overrides.insert(key, 0.0);
        self.weights()
    }

    /// Exclude, refusing when nobody selectable would remain
    pub fn try_exclude(&mut self, name: &str) -> Result<Vec<f64>, RouletteError> {
        if !self.can_exclude(name) {
            return Err(RouletteError::CannotExclude(normalize_key(name)));
        }
        Ok(self.exclude(name))
    }

    /// Undo an exclusion. Halved or doubled weights are left alone.
    pub fn restore(&mut self, name: &str) {
        let key = normalize_key(name);
        if self.overrides.get(&key) == Some(&0.0) {
            log::debug!("{:?} restored", key);
            self.overrides.remove(&key);
        }
    }

    /// Drop a participant from the roster along with any override
    pub fn remove(&mut self, name: &str) {
        let key = normalize_key(name);
        self.roster.remove(&key);
        self.overrides.remove(&key);
    }

    pub fn reset_all(&mut self) {
        self.overrides.clear();
    }

    /// Number of participants with a positive weight
    pub fn selectable_count(&self) -> usize {
        self.weights().iter().filter(|w| **w > 0.0).count()
    }

    /// Whether excluding `name` still leaves someone selectable
    pub fn can_exclude(&self, name: &str) -> bool {
        let Some(index) = self.roster.position(name) else {
            return false;
        };
        self.weights()
            .iter()
            .enumerate()
            .any(|(i, w)| i != index && *w > 0.0)
    }
}

fn sanitize(weight: f64) -> f64 {
    if weight.is_finite() && weight >= 0.0 {
        weight
    } else {
        log::warn!("Weight {} clamped to 0", weight);
        0.0
    }
}
