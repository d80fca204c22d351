//! Donor registration form input and validation.

use crate::config::RegistrationConfig;
use crate::donor::{BloodGroup, NewDonor};

/// Raw field values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorForm {
    /// Name field.
    pub name: String,
    /// Age field.
    pub age: String,
    /// Blood group field.
    pub blood_group: String,
    /// Contact field.
    pub contact: String,
    /// City field.
    pub city: String,
}

/// Why a form was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormRejection {
    /// A required field is empty after trimming.
    MissingField(&'static str),
    /// The age field does not start with an integer.
    InvalidAge(String),
    /// The blood group field names no known group.
    UnknownBloodGroup(String),
}

impl std::fmt::Display for FormRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} is required"),
            Self::InvalidAge(raw) => write!(f, "age '{raw}' is not a number"),
            Self::UnknownBloodGroup(raw) => write!(f, "unknown blood group '{raw}'"),
        }
    }
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidForm {
    /// Ready to commit.
    Ready(NewDonor),
    /// Acceptable, but the age is outside the typical donation range and the
    /// user has to agree before committing.
    NeedsAgeConfirmation(NewDonor),
}

impl DonorForm {
    /// Check the fields.
    ///
    /// Name, blood group, contact and city must be non-empty once trimmed and
    /// the age must parse as an integer.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self, rules: &RegistrationConfig) -> Result<ValidForm, FormRejection> {
        let name = required("name", &self.name)?;
        let blood_group = required("blood group", &self.blood_group)?;
        let contact = required("contact", &self.contact)?;
        let city = required("city", &self.city)?;

        let age =
            parse_leading_int(&self.age).ok_or_else(|| FormRejection::InvalidAge(self.age.clone()))?;
        let blood_group = blood_group
            .parse::<BloodGroup>()
            .map_err(|_| FormRejection::UnknownBloodGroup(blood_group.to_string()))?;

        let donor = NewDonor {
            name: name.to_string(),
            age,
            blood_group,
            contact: contact.to_string(),
            city: city.to_string(),
        };

        if rules.age_in_range(age) {
            Ok(ValidForm::Ready(donor))
        } else {
            Ok(ValidForm::NeedsAgeConfirmation(donor))
        }
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, FormRejection> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormRejection::MissingField(field))
    } else {
        Ok(value)
    }
}

/// Parse the integer at the start of `raw`.
///
/// Leading whitespace and one sign character are accepted, then the longest
/// run of ASCII digits; anything after it is ignored, so `"30 years"` is 30
/// and `"3.7"` is 3. Returns `None` when no digit follows.
#[must_use]
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
