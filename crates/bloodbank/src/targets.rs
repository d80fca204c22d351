//! Per-group donor targets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::donor::BloodGroup;

/// Built-in target for a group, used when no table has been saved yet and for
/// groups missing from a saved table.
#[must_use]
pub fn default_target(group: BloodGroup) -> u32 {
    match group {
        BloodGroup::APos | BloodGroup::BPos => 20,
        BloodGroup::ANeg => 8,
        BloodGroup::BNeg | BloodGroup::AbPos => 6,
        BloodGroup::AbNeg => 3,
        BloodGroup::OPos => 30,
        BloodGroup::ONeg => 10,
    }
}

/// Desired donor count per blood group.
///
/// Serializes as a JSON object keyed by group label, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetTable(BTreeMap<BloodGroup, u32>);

impl Default for TargetTable {
    fn default() -> Self {
        Self(
            BloodGroup::CANONICAL
                .into_iter()
                .map(|group| (group, default_target(group)))
                .collect(),
        )
    }
}

impl TargetTable {
    /// A table with no entries at all.
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// The stored target for `group`, if the table has one.
    #[must_use]
    pub fn get(&self, group: BloodGroup) -> Option<u32> {
        self.0.get(&group).copied()
    }

    /// The effective target for `group`: the stored value, else the default.
    #[must_use]
    pub fn target_for(&self, group: BloodGroup) -> u32 {
        self.get(group).unwrap_or_else(|| default_target(group))
    }

    /// Set the target for `group`.
    pub fn set(&mut self, group: BloodGroup, target: u32) {
        self.0.insert(group, target);
    }

    /// Number of groups with a stored target.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no group has a stored target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse persisted JSON text, keeping whatever entries are usable.
    ///
    /// Returns `None` when the text is not a JSON object. Keys that are not a
    /// blood group, and values that are not non-negative integers, are skipped.
    #[must_use]
    pub fn from_json_lenient(text: &str) -> Option<Self> {
        let serde_json::Value::Object(entries) = serde_json::from_str(text).ok()? else {
            return None;
        };

        let mut table = Self::empty();
        for (key, value) in entries {
            let Ok(group) = key.parse::<BloodGroup>() else {
                warn!("Ignoring target for unknown blood group '{}'", key);
                continue;
            };
            match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                Some(target) => table.set(group, target),
                None => warn!("Ignoring invalid target {} for {}", value, group),
            }
        }
        Some(table)
    }
}

impl FromIterator<(BloodGroup, u32)> for TargetTable {
    fn from_iter<I: IntoIterator<Item = (BloodGroup, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
