//! The editing application store.
//!
//! A single staging slot for the application a form is currently working on,
//! whether that is a fresh draft or a submitted application reopened for
//! changes. Last write wins; no history.

use std::sync::{PoisonError, RwLock};

use crate::application::Application;

#[derive(Debug, Default)]
pub struct EditingStore {
    slot: RwLock<Option<Application>>,
}

impl EditingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently staged application, if any.
    #[must_use]
    pub fn load(&self) -> Option<Application> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace whatever is staged.
    pub fn stage(&self, application: Application) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(application);
    }

    /// Drop the staged application.
    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn is_staged(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        ApplicationStatus, ElectricalOption, PitchType, SubmittedApplication,
    };

    fn submitted(db_id: u32) -> SubmittedApplication {
        SubmittedApplication {
            db_id,
            user_id: "user-1".into(),
            status: ApplicationStatus::Submitted,
            created: "2024-03-01T10:00:00Z".into(),
            trading_name: "Willow Woodcraft".into(),
            address_line_1: "1 Fair Lane".into(),
            address_line_2: String::new(),
            city: "Ulverston".into(),
            state: "Cumbria".into(),
            postcode: "LA12 7AA".into(),
            country: "UK".into(),
            contact_first_names: "Ada".into(),
            contact_last_name: "Weaver".into(),
            email: "ada@example.com".into(),
            landline: String::new(),
            mobile: String::new(),
            website: String::new(),
            description_of_stall: "Hand-turned bowls".into(),
            pitch_type: PitchType::StandardNoShelter,
            pitch_additional_width: 0,
            pitch_van_space_required: false,
            pitch_electrical_options: ElectricalOption::None,
            camping_required: false,
            tables: 0,
            total_cost: 460,
            deposit_order_number: 0,
            deposit_order_key: String::new(),
            deposit_amount: None,
            deposit_amount_paid: None,
            document_folder: None,
        }
    }

    #[test]
    fn starts_empty() {
        let store = EditingStore::new();
        assert!(!store.is_staged());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn last_write_wins() {
        let store = EditingStore::new();
        store.stage(Application::Submitted(submitted(1)));
        store.stage(Application::Submitted(submitted(2)));

        let staged = store.load().unwrap();
        assert_eq!(staged.as_submitted().map(|s| s.db_id), Some(2));
    }

    #[test]
    fn clear_empties_the_slot() {
        let store = EditingStore::new();
        store.stage(Application::Submitted(submitted(1)));
        store.clear();
        assert!(!store.is_staged());
    }
}
