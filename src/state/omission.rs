use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Images excluded from annotation, with the reason given for each
///
/// Serialized inline in the session config as `omitted_images` (insertion
/// order) and `omitted_reasons`. Entries are never removed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct OmissionLedger {
    #[serde(rename = "omitted_images", default)]
    names: Vec<String>,
    #[serde(rename = "omitted_reasons", default)]
    reasons: BTreeMap<String, String>,
}

impl OmissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as omitted
    ///
    /// Omitting a name twice only replaces its reason. Returns true when the
    /// name was not already in the ledger.
    pub fn omit(&mut self, name: &str, reason: &str) -> bool {
        let added = !self.contains(name);
        if added {
            self.names.push(name.to_string());
        }
        self.reasons.insert(name.to_string(), reason.to_string());
        added
    }

    /// Every omitted name has an entry in `reasons`, so lookups go through the map
    pub fn contains(&self, name: &str) -> bool {
        self.reasons.contains_key(name)
    }

    /// Reason recorded for `name`, empty when none was given
    pub fn reason(&self, name: &str) -> Option<&str> {
        if !self.contains(name) {
            return None;
        }
        Some(self.reasons.get(name).map_or("", String::as_str))
    }

    /// `(name, reason)` pairs in the order images were omitted
    pub fn list(&self) -> Vec<(&str, &str)> {
        self.names
            .iter()
            .map(|name| {
                let reason = self.reasons.get(name).map_or("", String::as_str);
                (name.as_str(), reason)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Repair hand-edited config files: drop duplicate names, give every name
    /// a reason entry and drop reasons for names that were never omitted
    pub(crate) fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.names.retain(|name| seen.insert(name.clone()));
        self.reasons.retain(|name, _| seen.contains(name));
        for name in &self.names {
            self.reasons.entry(name.clone()).or_default();
        }
    }
}
