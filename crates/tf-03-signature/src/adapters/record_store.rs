//! In-memory append-only signature record store.

use crate::ports::outbound::SignatureRecordStore;
use parking_lot::RwLock;
use shared_types::{DeclarationId, SignatureRecord};

#[derive(Debug, Default)]
pub struct InMemorySignatureRecordStore {
    records: RwLock<Vec<SignatureRecord>>,
}

impl InMemorySignatureRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl SignatureRecordStore for InMemorySignatureRecordStore {
    fn append(&self, record: SignatureRecord) {
        self.records.write().push(record);
    }

    fn for_declaration(&self, declaration_id: DeclarationId) -> Vec<SignatureRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.declaration_id == declaration_id)
            .cloned()
            .collect()
    }
}
