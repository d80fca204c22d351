//! Registry operations: registering donors, deleting them, and editing targets.
//!
//! Each operation is one uninterrupted read-modify-write against the injected
//! [`Repository`]. Anything that needs the user (a blocking notice, a yes/no
//! decision) goes through [`Interaction`], so the same flows run on a
//! terminal or under test.

mod editor;
mod form;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::RegistrationConfig;
use crate::donor::DonorRecord;
use crate::error::Result;
use crate::storage::Repository;
use crate::targets::TargetTable;

pub use editor::{coerce_target, TargetEditor, TargetInput};
pub use form::{parse_leading_int, DonorForm, FormRejection, ValidForm};

/// Shown when a registration form is refused.
pub const REJECTED_MESSAGE: &str = "Please fill all fields correctly.";

/// Shown after a donor is registered.
pub const REGISTERED_MESSAGE: &str =
    "Registration successful — thank you! You can view availability.";

/// Asked before a donor is deleted.
pub const DELETE_PROMPT: &str = "Delete this donor?";

/// Shown after targets are saved.
pub const TARGETS_SAVED_MESSAGE: &str = "Targets saved.";

/// The user-facing side of registry operations.
pub trait Interaction {
    /// Ask a yes/no question; `true` means go ahead.
    fn confirm(&mut self, message: &str) -> bool;

    /// Tell the user something and wait for acknowledgement if needed.
    fn notify(&mut self, message: &str);
}

/// Result of submitting the registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The donor was stored.
    Committed(DonorRecord),
    /// The form was invalid; nothing changed.
    Rejected(FormRejection),
    /// The user declined the age confirmation; nothing changed.
    Declined,
}

/// Result of a deletion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    /// The donor was removed.
    Deleted(DonorRecord),
    /// No donor has that id; nothing changed.
    NotFound,
    /// The user declined; nothing changed.
    Declined,
}

/// Registry operations over a repository.
#[derive(Debug)]
pub struct Registry<R> {
    repo: R,
    rules: RegistrationConfig,
}

impl<R: Repository> Registry<R> {
    /// Create a registry over `repo`.
    #[must_use]
    pub fn new(repo: R, rules: RegistrationConfig) -> Self {
        Self { repo, rules }
    }

    /// The underlying repository.
    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Current donors and targets, read fresh from the repository.
    #[must_use]
    pub fn snapshot(&self) -> (Vec<DonorRecord>, TargetTable) {
        (self.repo.load_donors(), self.repo.load_targets())
    }

    /// Submit the registration form, stamping the record with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error only if the donor list cannot be written.
    pub fn register(
        &self,
        form: &mut DonorForm,
        ui: &mut dyn Interaction,
    ) -> Result<Registration> {
        self.register_at(form, Utc::now(), ui)
    }

    /// Submit the registration form with an explicit creation time.
    ///
    /// An invalid form is reported through `ui` and left as typed. An age
    /// outside the configured range is confirmed with the user first. On
    /// commit the record is appended, the form is cleared and the user is
    /// told.
    ///
    /// # Errors
    ///
    /// Returns an error only if the donor list cannot be written.
    pub fn register_at(
        &self,
        form: &mut DonorForm,
        now: DateTime<Utc>,
        ui: &mut dyn Interaction,
    ) -> Result<Registration> {
        let donor = match form.validate(&self.rules) {
            Err(rejection) => {
                debug!("Registration rejected: {}", rejection);
                ui.notify(REJECTED_MESSAGE);
                return Ok(Registration::Rejected(rejection));
            }
            Ok(ValidForm::Ready(donor)) => donor,
            Ok(ValidForm::NeedsAgeConfirmation(donor)) => {
                if !ui.confirm(&self.age_prompt()) {
                    debug!("Registration declined at age confirmation");
                    return Ok(Registration::Declined);
                }
                donor
            }
        };

        let record = DonorRecord::new(donor, now);
        let stored = record.clone();
        self.repo.update_donors(&mut |donors| {
            donors.push(stored.clone());
            true
        })?;

        info!(
            "Registered donor {} ({})",
            record.id, record.blood_group
        );
        form.reset();
        ui.notify(REGISTERED_MESSAGE);
        Ok(Registration::Committed(record))
    }

    /// Delete the donor with `id` after the user confirms.
    ///
    /// # Errors
    ///
    /// Returns an error only if the donor list cannot be written.
    pub fn delete(&self, id: i64, ui: &mut dyn Interaction) -> Result<Deletion> {
        if !ui.confirm(DELETE_PROMPT) {
            return Ok(Deletion::Declined);
        }

        let mut removed = None;
        self.repo.update_donors(&mut |donors| {
            let before = donors.len();
            if let Some(pos) = donors.iter().position(|donor| donor.id == id) {
                removed = Some(donors[pos].clone());
            }
            donors.retain(|donor| donor.id != id);
            donors.len() != before
        })?;

        match removed {
            Some(record) => {
                info!("Deleted donor {}", id);
                Ok(Deletion::Deleted(record))
            }
            None => {
                debug!("No donor with id {} to delete", id);
                Ok(Deletion::NotFound)
            }
        }
    }

    /// An editor seeded with the stored targets.
    #[must_use]
    pub fn target_editor(&self) -> TargetEditor {
        TargetEditor::seeded(&self.repo.load_targets())
    }

    /// Save the editor's values as the new target table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be written.
    pub fn save_targets(
        &self,
        editor: &TargetEditor,
        ui: &mut dyn Interaction,
    ) -> Result<TargetTable> {
        let table = editor.to_table();
        self.repo.save_targets(&table)?;
        info!("Saved targets for {} groups", table.len());
        ui.notify(TARGETS_SAVED_MESSAGE);
        Ok(table)
    }

    fn age_prompt(&self) -> String {
        format!(
            "Age is outside typical donation range ({}–{}). Still register?",
            self.rules.min_age, self.rules.max_age
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donor::BloodGroup;
    use crate::storage::Storage;
    use chrono::TimeZone;

    /// Answers confirmations from a fixed script and records notices.
    #[derive(Debug, Default)]
    struct Scripted {
        answers: Vec<bool>,
        prompts: Vec<String>,
        notices: Vec<String>,
    }

    impl Scripted {
        fn answering(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().rev().copied().collect(),
                ..Self::default()
            }
        }
    }

    impl Interaction for Scripted {
        fn confirm(&mut self, message: &str) -> bool {
            self.prompts.push(message.to_string());
            self.answers.pop().unwrap_or(false)
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    fn registry() -> Registry<Storage> {
        Registry::new(
            Storage::open_in_memory().unwrap(),
            RegistrationConfig::default(),
        )
    }

    fn form(name: &str, age: &str, group: &str) -> DonorForm {
        DonorForm {
            name: name.to_string(),
            age: age.to_string(),
            blood_group: group.to_string(),
            contact: "555".to_string(),
            city: "X".to_string(),
        }
    }

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, second).unwrap()
    }

    #[test]
    fn test_register_commits_and_resets_form() {
        let registry = registry();
        let mut ui = Scripted::default();
        let mut f = form("Jo", "30", "O+");

        let outcome = registry.register_at(&mut f, at(0), &mut ui).unwrap();

        let Registration::Committed(record) = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        assert_eq!(record.id, at(0).timestamp_millis());
        assert_eq!(registry.repository().load_donors(), vec![record]);
        assert_eq!(f, DonorForm::default());
        assert_eq!(ui.notices, [REGISTERED_MESSAGE]);
        assert!(ui.prompts.is_empty());
    }

    #[test]
    fn test_register_rejects_without_state_change() {
        let registry = registry();
        let mut ui = Scripted::default();
        let mut f = form("Jo", "", "O+");

        let outcome = registry.register_at(&mut f, at(0), &mut ui).unwrap();

        assert!(matches!(outcome, Registration::Rejected(FormRejection::InvalidAge(_))));
        assert!(registry.repository().load_donors().is_empty());
        assert_eq!(f.name, "Jo");
        assert_eq!(ui.notices, [REJECTED_MESSAGE]);
    }

    #[test]
    fn test_register_out_of_range_age_declined() {
        let registry = registry();
        let mut ui = Scripted::answering(&[false]);
        let mut f = form("Old", "80", "A-");

        let outcome = registry.register_at(&mut f, at(0), &mut ui).unwrap();

        assert_eq!(outcome, Registration::Declined);
        assert!(registry.repository().load_donors().is_empty());
        assert_eq!(f.name, "Old");
        assert_eq!(
            ui.prompts,
            ["Age is outside typical donation range (16–75). Still register?"]
        );
        assert!(ui.notices.is_empty());
    }

    #[test]
    fn test_register_out_of_range_age_accepted() {
        let registry = registry();
        let mut ui = Scripted::answering(&[true]);
        let mut f = form("Young", "15", "A-");

        let outcome = registry.register_at(&mut f, at(0), &mut ui).unwrap();

        assert!(matches!(outcome, Registration::Committed(_)));
        assert_eq!(registry.repository().load_donors().len(), 1);
    }

    #[test]
    fn test_register_appends_in_order() {
        let registry = registry();
        let mut ui = Scripted::default();
        registry
            .register_at(&mut form("A", "20", "A+"), at(0), &mut ui)
            .unwrap();
        registry
            .register_at(&mut form("B", "21", "B+"), at(1), &mut ui)
            .unwrap();

        let names: Vec<_> = registry
            .repository()
            .load_donors()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn test_delete_confirmed() {
        let registry = registry();
        let mut ui = Scripted::answering(&[true]);
        registry
            .register_at(&mut form("A", "20", "A+"), at(0), &mut ui)
            .unwrap();
        registry
            .register_at(&mut form("B", "21", "B+"), at(1), &mut ui)
            .unwrap();

        let mut ui = Scripted::answering(&[true]);
        let outcome = registry.delete(at(0).timestamp_millis(), &mut ui).unwrap();

        assert!(matches!(outcome, Deletion::Deleted(ref d) if d.name == "A"));
        let donors = registry.repository().load_donors();
        assert_eq!(donors.len(), 1);
        assert_eq!(donors[0].name, "B");
        assert_eq!(ui.prompts, [DELETE_PROMPT]);
    }

    #[test]
    fn test_delete_declined_is_noop() {
        let registry = registry();
        let mut ui = Scripted::default();
        registry
            .register_at(&mut form("A", "20", "A+"), at(0), &mut ui)
            .unwrap();

        let mut ui = Scripted::answering(&[false]);
        let outcome = registry.delete(at(0).timestamp_millis(), &mut ui).unwrap();

        assert_eq!(outcome, Deletion::Declined);
        assert_eq!(registry.repository().load_donors().len(), 1);
    }

    #[test]
    fn test_delete_unknown_id_leaves_list_unchanged() {
        let registry = registry();
        let mut ui = Scripted::default();
        registry
            .register_at(&mut form("A", "20", "A+"), at(0), &mut ui)
            .unwrap();
        let before = registry.repository().load_donors();

        let mut ui = Scripted::answering(&[true]);
        let outcome = registry.delete(42, &mut ui).unwrap();

        assert_eq!(outcome, Deletion::NotFound);
        assert_eq!(registry.repository().load_donors(), before);
    }

    #[test]
    fn test_save_targets_replaces_table() {
        let registry = registry();
        let mut ui = Scripted::default();
        let mut editor = registry.target_editor();
        editor.set_input(BloodGroup::OPos, "10");
        editor.set_input(BloodGroup::AbNeg, "nope");

        let saved = registry.save_targets(&editor, &mut ui).unwrap();

        assert_eq!(saved.get(BloodGroup::OPos), Some(10));
        assert_eq!(saved.get(BloodGroup::AbNeg), Some(0));
        assert_eq!(registry.repository().load_targets(), saved);
        assert_eq!(ui.notices, [TARGETS_SAVED_MESSAGE]);
    }

    #[test]
    fn test_registry_over_borrowed_storage() {
        let storage = Storage::open_in_memory().unwrap();
        let registry = Registry::new(&storage, RegistrationConfig::default());
        let mut ui = Scripted::default();

        registry
            .register_at(&mut form("Jo", "30", "O+"), at(0), &mut ui)
            .unwrap();

        assert_eq!(storage.load_donors().len(), 1);
        assert_eq!(registry.snapshot().0.len(), 1);
    }

    #[test]
    fn test_snapshot_defaults() {
        let (donors, targets) = registry().snapshot();
        assert!(donors.is_empty());
        assert_eq!(targets, TargetTable::default());
    }
}
