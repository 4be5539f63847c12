//! Shareable session snapshot
//!
//! The only state that outlives a page load: the name list, the honorific
//! toggle and the last winner (which seeds the next round's exclusion
//! prompt). Weights and wheel rotation are deliberately not shared.
//! Turning the JSON into a URL is the share layer's job.

use serde::{Deserialize, Serialize};

use crate::error::RouletteError;
use crate::roster::{Roster, normalize_key};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSnapshot {
    /// Participant keys, one per line, no honorific
    #[serde(default)]
    pub names: String,
    #[serde(default = "default_true")]
    pub with_honorific: bool,
    /// Key of the previous winner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_winner: Option<String>,
}

impl Default for ShareSnapshot {
    fn default() -> Self {
        Self {
            names: String::new(),
            with_honorific: true,
            last_winner: None,
        }
    }
}

impl ShareSnapshot {
    pub fn new(roster: &Roster, last_winner: Option<&str>) -> Self {
        Self {
            names: roster.to_raw(),
            with_honorific: roster.with_honorific(),
            last_winner: last_winner.map(normalize_key),
        }
    }

    pub fn roster(&self) -> Roster {
        Roster::parse(&self.names, self.with_honorific)
    }

    /// Last winner key, normalized; empty keys are dropped
    pub fn last_winner_key(&self) -> Option<String> {
        self.last_winner
            .as_deref()
            .map(normalize_key)
            .filter(|k| !k.is_empty())
    }

    pub fn to_json(&self) -> Result<String, RouletteError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RouletteError> {
        Ok(serde_json::from_str(json)?)
    }
}
