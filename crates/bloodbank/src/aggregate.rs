//! Aggregation of donor records against per-group targets.
//!
//! Everything here is pure: the same donors and targets always produce the
//! same counts, ranking and percentages. Arithmetic is done on integers so
//! that ties and rounding are exact.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::donor::{BloodGroup, DonorRecord};
use crate::targets::TargetTable;

/// Number of donors per blood group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupCounts(BTreeMap<BloodGroup, usize>);

impl GroupCounts {
    /// Donors in `group`; zero when none were counted.
    #[must_use]
    pub fn get(&self, group: BloodGroup) -> usize {
        self.0.get(&group).copied().unwrap_or(0)
    }

    /// Sum over all groups.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

/// Count donors per blood group in a single pass.
#[must_use]
pub fn count_by_group(donors: &[DonorRecord]) -> GroupCounts {
    let mut counts = BTreeMap::new();
    for donor in donors {
        *counts.entry(donor.blood_group).or_insert(0) += 1;
    }
    GroupCounts(counts)
}

/// A group's shortage ratio `count / target`, kept as an exact fraction.
///
/// A target of zero is treated as one.
#[derive(Debug, Clone, Copy)]
struct ShortageRatio {
    count: u128,
    target: u128,
}

impl ShortageRatio {
    fn new(count: usize, target: u32) -> Self {
        Self {
            count: u128::try_from(count).unwrap_or(u128::MAX),
            target: u128::from(target.max(1)),
        }
    }

    fn compare(self, other: Self) -> Ordering {
        (self.count * other.target).cmp(&(other.count * self.target))
    }
}

/// The group whose donor count is lowest relative to its target.
///
/// Groups are scanned in canonical order and the first group with the
/// smallest ratio wins ties. A zero target counts as one, so a group with a
/// zero target and no donors ties with every other empty group.
///
/// Returns `None` only when the target table has no entries.
#[must_use]
pub fn most_needed(counts: &GroupCounts, targets: &TargetTable) -> Option<BloodGroup> {
    if targets.is_empty() {
        return None;
    }

    let mut best: Option<(BloodGroup, ShortageRatio)> = None;
    for group in BloodGroup::CANONICAL {
        let ratio = ShortageRatio::new(counts.get(group), targets.target_for(group));
        match best {
            Some((_, lowest)) if ratio.compare(lowest) != Ordering::Less => {}
            _ => best = Some((group, ratio)),
        }
    }
    best.map(|(group, _)| group)
}

/// Progress towards `target` as a whole percentage clamped to `0..=100`.
///
/// Rounds half up. Returns `None` for a zero target, which callers show as
/// "N/A" rather than a number.
#[must_use]
pub fn percent_of_target(count: usize, target: u32) -> Option<u8> {
    if target == 0 {
        return None;
    }
    let count = u64::try_from(count).unwrap_or(u64::MAX);
    let target = u64::from(target);
    let percent = count
        .saturating_mul(200)
        .saturating_add(target)
        .checked_div(target * 2)
        .unwrap_or(0)
        .min(100);
    u8::try_from(percent).ok()
}
