//! In-memory confirmation store.

use crate::domain::errors::ConfirmationError;
use crate::ports::outbound::{ConfirmationStore, InsertOutcome};
use parking_lot::RwLock;
use shared_types::Confirmation;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryConfirmationStore {
    records: RwLock<HashMap<String, Confirmation>>,
}

impl InMemoryConfirmationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfirmationStore for InMemoryConfirmationStore {
    fn insert_if_absent(&self, confirmation: Confirmation) -> Result<InsertOutcome, ConfirmationError> {
        let mut records = self.records.write();
        if records.contains_key(&confirmation.confirmation_number) {
            return Ok(InsertOutcome::AlreadyPresent);
        }
        records.insert(confirmation.confirmation_number.clone(), confirmation);
        Ok(InsertOutcome::Inserted)
    }

    fn get(&self, confirmation_number: &str) -> Option<Confirmation> {
        self.records.read().get(confirmation_number).cloned()
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }
}
