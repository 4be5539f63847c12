//! Participant roster
//!
//! Turns the raw multi-line name input into ordered participant keys.
//! A key is the trimmed name with any trailing honorific removed, so
//! toggling the honorific never changes identity or order.

use serde::{Deserialize, Serialize};

use crate::consts::HONORIFIC_SUFFIX;

/// Normalize a display name or key to its participant key
pub fn normalize_key(name: &str) -> String {
    let trimmed = name.trim();
    trimmed
        .strip_suffix(HONORIFIC_SUFFIX)
        .unwrap_or(trimmed)
        .trim_end()
        .to_string()
}

/// Ordered, duplicate-free participant keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    keys: Vec<String>,
    with_honorific: bool,
}

impl Roster {
    /// Parse raw input: one name per line, blank lines dropped.
    ///
    /// Names that normalize to the same key collapse into one participant
    /// at the position where the key first appeared.
    pub fn parse(raw: &str, with_honorific: bool) -> Self {
        let mut roster = Self {
            keys: Vec::new(),
            with_honorific,
        };
        for line in raw.lines() {
            let key = normalize_key(line);
            if key.is_empty() {
                continue;
            }
            if roster.contains(&key) {
                log::debug!("Duplicate participant {:?} merged", key);
                continue;
            }
            roster.keys.push(key);
        }
        roster
    }

    #[inline]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn with_honorific(&self) -> bool {
        self.with_honorific
    }

    /// Toggle the display honorific (keys and order are untouched)
    pub fn set_with_honorific(&mut self, value: bool) {
        self.with_honorific = value;
    }

    /// Index of a participant; accepts display names too
    pub fn position(&self, name: &str) -> Option<usize> {
        let key = normalize_key(name);
        self.keys.iter().position(|k| *k == key)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    /// Drop a participant; returns whether anything was removed
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => {
                self.keys.remove(i);
                true
            }
            None => false,
        }
    }

    /// Display label for a key
    pub fn display_name(&self, key: &str) -> String {
        if self.with_honorific {
            format!("{key}{HONORIFIC_SUFFIX}")
        } else {
            key.to_string()
        }
    }

    pub fn display_names(&self) -> Vec<String> {
        self.keys.iter().map(|k| self.display_name(k)).collect()
    }

    /// Raw text form (keys only, one per line)
    pub fn to_raw(&self) -> String {
        self.keys.join("\n")
    }
}
