//! Target table editing.

use crate::donor::BloodGroup;
use crate::error::{Error, Result};
use crate::targets::TargetTable;

use super::form::parse_leading_int;

/// One editable target value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInput {
    /// The group this input sets.
    pub group: BloodGroup,
    /// Raw text of the input.
    pub value: String,
}

/// A set of target inputs, one per group, seeded from the stored table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEditor {
    inputs: Vec<TargetInput>,
}

impl TargetEditor {
    /// One input per group in canonical order, holding the current target.
    #[must_use]
    pub fn seeded(targets: &TargetTable) -> Self {
        let inputs = BloodGroup::CANONICAL
            .into_iter()
            .map(|group| TargetInput {
                group,
                value: targets.target_for(group).to_string(),
            })
            .collect();
        Self { inputs }
    }

    /// The inputs in display order.
    #[must_use]
    pub fn inputs(&self) -> &[TargetInput] {
        &self.inputs
    }

    /// Replace the raw text of `group`'s input.
    pub fn set_input(&mut self, group: BloodGroup, value: impl Into<String>) {
        if let Some(input) = self.inputs.iter_mut().find(|input| input.group == group) {
            input.value = value.into();
        }
    }

    /// Apply a `GROUP=VALUE` assignment such as `O-=12`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no `=` or the group is unknown.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<()> {
        let (group, value) = assignment.split_once('=').ok_or_else(|| {
            Error::invalid_input(format!("expected GROUP=VALUE, got '{assignment}'"))
        })?;
        let group = group.parse::<BloodGroup>()?;
        self.set_input(group, value.trim());
        Ok(())
    }

    /// Build the table to save: every input coerced to a target.
    ///
    /// The result holds exactly the editor's groups and replaces the stored
    /// table as a whole.
    #[must_use]
    pub fn to_table(&self) -> TargetTable {
        self.inputs
            .iter()
            .map(|input| (input.group, coerce_target(&input.value)))
            .collect()
    }
}

/// Coerce raw input text to a target.
///
/// Non-numbers and negatives become 0; values too large for a target
/// saturate at `u32::MAX`.
#[must_use]
pub fn coerce_target(raw: &str) -> u32 {
    match parse_leading_int(raw) {
        Some(value) if value > 0 => u32::try_from(value).unwrap_or(u32::MAX),
        _ => 0,
    }
}
