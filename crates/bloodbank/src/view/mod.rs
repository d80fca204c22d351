//! View models for the registry's pages.
//!
//! The functions here turn donors and targets into plain data describing what
//! to show. They do no I/O and hold no state; [`text`] and [`html`] turn the
//! models into output, and the models also serialize to JSON as they are.

pub mod html;
pub mod text;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::aggregate::{count_by_group, most_needed, percent_of_target};
use crate::donor::{BloodGroup, DonorRecord};
use crate::targets::TargetTable;

/// Placeholder shown when no group can be ranked.
pub const NO_GROUP: &str = "—";

/// Shown in place of the donor table when there are no donors.
pub const NO_DONORS_MESSAGE: &str = "No donors registered yet.";

/// Shown in place of a percentage when the target is zero.
pub const NOT_APPLICABLE: &str = "N/A";

/// Shown on a bar that has reached its target.
pub const FULL_LABEL: &str = "✓ Full";

/// Headline numbers for the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeStats {
    /// Number of registered donors.
    pub total_donors: usize,
    /// The most needed group, if any can be ranked.
    pub most_needed: Option<BloodGroup>,
    /// Text for the most-needed field.
    pub most_needed_label: String,
}

/// One group's progress towards its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityCard {
    /// The group.
    pub group: BloodGroup,
    /// Registered donors in the group.
    pub count: usize,
    /// Effective target for the group.
    pub target: u32,
    /// Clamped percentage of target; `None` when the target is zero.
    pub percent: Option<u8>,
    /// `"NN%"` or `"N/A"`.
    pub percent_text: String,
    /// Text drawn on the bar.
    pub bar_label: String,
    /// Filled share of the bar, `0..=100`.
    pub bar_width: u8,
}

/// One row of the donor table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonorRow {
    /// Donor id, used to address deletion.
    pub id: i64,
    /// Name.
    pub name: String,
    /// Blood group label.
    pub blood_group: String,
    /// Age.
    pub age: String,
    /// Contact detail.
    pub contact: String,
    /// City.
    pub city: String,
    /// Registration time for display.
    pub registered: String,
}

/// All donors, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DonorTable {
    /// Rows in display order.
    pub rows: Vec<DonorRow>,
}

impl DonorTable {
    /// Whether there is nothing to list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything the registry can show, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryView {
    /// Home page numbers.
    pub home: HomeStats,
    /// Availability cards in display order.
    pub availability: Vec<AvailabilityCard>,
    /// Donor table.
    pub donors: DonorTable,
}

/// Compute the home page numbers.
#[must_use]
pub fn home_stats(donors: &[DonorRecord], targets: &TargetTable) -> HomeStats {
    let counts = count_by_group(donors);
    let most_needed = most_needed(&counts, targets);
    let total_donors = donors.len();

    let mut most_needed_label = most_needed.map_or(NO_GROUP, BloodGroup::label).to_string();
    if total_donors == 0 {
        most_needed_label.push_str(" (no donors yet)");
    }

    HomeStats {
        total_donors,
        most_needed,
        most_needed_label,
    }
}

/// Compute one card per group in display order.
#[must_use]
pub fn availability(donors: &[DonorRecord], targets: &TargetTable) -> Vec<AvailabilityCard> {
    let counts = count_by_group(donors);
    BloodGroup::DISPLAY_ORDER
        .into_iter()
        .map(|group| {
            let count = counts.get(group);
            let target = targets.target_for(group);
            let percent = percent_of_target(count, target);
            let percent_text = percent.map_or_else(|| NOT_APPLICABLE.to_string(), |p| format!("{p}%"));
            let bar_label = if percent == Some(100) {
                FULL_LABEL.to_string()
            } else {
                percent_text.clone()
            };
            AvailabilityCard {
                group,
                count,
                target,
                percent,
                percent_text,
                bar_label,
                bar_width: percent.unwrap_or(0),
            }
        })
        .collect()
}

/// Build the donor table with registration times shown in local time.
#[must_use]
pub fn donor_table(donors: &[DonorRecord]) -> DonorTable {
    donor_table_in(donors, &chrono::Local)
}

/// Build the donor table with registration times shown in `tz`.
#[must_use]
pub fn donor_table_in<Tz>(donors: &[DonorRecord], tz: &Tz) -> DonorTable
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let rows = donors
        .iter()
        .rev()
        .map(|donor| DonorRow {
            id: donor.id,
            name: donor.name.clone(),
            blood_group: donor.blood_group.label().to_string(),
            age: donor.age.to_string(),
            contact: donor.contact.clone(),
            city: donor.city.clone(),
            registered: donor
                .registered_at()
                .map_or_else(|| donor.date_registered.clone(), |at| format_time(&at.with_timezone(tz))),
        })
        .collect();
    DonorTable { rows }
}

/// Compute every view from one snapshot of the data.
#[must_use]
pub fn render(donors: &[DonorRecord], targets: &TargetTable) -> RegistryView {
    RegistryView {
        home: home_stats(donors, targets),
        availability: availability(donors, targets),
        donors: donor_table(donors),
    }
}

fn format_time<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}
