//! Core donor types for bloodbank.
//!
//! This module defines the blood group enumeration and the donor record that
//! the registry persists.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One of the eight ABO/Rh blood groups.
///
/// Variants are declared in canonical order, which is also the order used to
/// break ties when ranking groups by need. `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    /// A, Rh positive.
    #[serde(rename = "A+")]
    APos,
    /// A, Rh negative.
    #[serde(rename = "A-")]
    ANeg,
    /// B, Rh positive.
    #[serde(rename = "B+")]
    BPos,
    /// B, Rh negative.
    #[serde(rename = "B-")]
    BNeg,
    /// AB, Rh positive.
    #[serde(rename = "AB+")]
    AbPos,
    /// AB, Rh negative.
    #[serde(rename = "AB-")]
    AbNeg,
    /// O, Rh positive.
    #[serde(rename = "O+")]
    OPos,
    /// O, Rh negative.
    #[serde(rename = "O-")]
    ONeg,
}

impl BloodGroup {
    /// All groups in canonical (tie-break) order.
    pub const CANONICAL: [Self; 8] = [
        Self::APos,
        Self::ANeg,
        Self::BPos,
        Self::BNeg,
        Self::AbPos,
        Self::AbNeg,
        Self::OPos,
        Self::ONeg,
    ];

    /// All groups in the order availability cards are shown.
    pub const DISPLAY_ORDER: [Self; 8] = [
        Self::OPos,
        Self::ONeg,
        Self::APos,
        Self::ANeg,
        Self::BPos,
        Self::BNeg,
        Self::AbPos,
        Self::AbNeg,
    ];

    /// The conventional label, e.g. `"AB-"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::APos => "A+",
            Self::ANeg => "A-",
            Self::BPos => "B+",
            Self::BNeg => "B-",
            Self::AbPos => "AB+",
            Self::AbNeg => "AB-",
            Self::OPos => "O+",
            Self::ONeg => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BloodGroup {
    type Err = Error;

    /// Parse a label, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::CANONICAL
            .into_iter()
            .find(|group| group.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownBloodGroup(wanted.to_string()))
    }
}

/// A registered donor.
///
/// Records are immutable once created; the only other lifecycle event is
/// deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorRecord {
    /// Creation time in Unix milliseconds. Unique unless two donors are
    /// created within the same millisecond.
    pub id: i64,

    /// Donor's name.
    pub name: String,

    /// Age in years at registration.
    pub age: i64,

    /// Blood group.
    pub blood_group: BloodGroup,

    /// Phone number or other contact detail.
    pub contact: String,

    /// City of residence.
    pub city: String,

    /// Registration time as ISO-8601 UTC, e.g. `2024-01-15T10:30:00.123Z`.
    pub date_registered: String,
}

/// Validated donor details, ready to become a [`DonorRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDonor {
    /// Donor's name, trimmed.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Blood group.
    pub blood_group: BloodGroup,
    /// Contact detail, trimmed.
    pub contact: String,
    /// City, trimmed.
    pub city: String,
}

impl DonorRecord {
    /// Create a record stamped with `now` as both its id and registration time.
    #[must_use]
    pub fn new(donor: NewDonor, now: DateTime<Utc>) -> Self {
        Self {
            id: now.timestamp_millis(),
            name: donor.name,
            age: donor.age,
            blood_group: donor.blood_group,
            contact: donor.contact,
            city: donor.city,
            date_registered: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Parse the stored registration time, if it is well formed.
    #[must_use]
    pub fn registered_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date_registered)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
