//! In-memory declaration repository.

use crate::domain::errors::RepositoryError;
use crate::ports::outbound::DeclarationRepository;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use shared_types::{AuditEntry, Declaration, DeclarationId, DeclarationStatus};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Tables {
    declarations: HashMap<DeclarationId, Declaration>,
    audit: HashMap<DeclarationId, Vec<AuditEntry>>,
    /// Confirmation number -> holder.
    confirmations: HashMap<String, DeclarationId>,
}

/// Single lock over all tables, so a commit is atomic.
#[derive(Debug, Default)]
pub struct InMemoryDeclarationRepository {
    tables: RwLock<Tables>,
}

impl InMemoryDeclarationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.read().declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DeclarationRepository for InMemoryDeclarationRepository {
    fn insert(&self, declaration: Declaration) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write();
        if tables.declarations.contains_key(&declaration.id) {
            return Err(RepositoryError::AlreadyExists(declaration.id));
        }
        if let Some(number) = &declaration.confirmation_number {
            if let Some(holder) = tables.confirmations.get(number) {
                return Err(RepositoryError::DuplicateConfirmationNumber {
                    number: number.clone(),
                    holder: *holder,
                });
            }
            tables.confirmations.insert(number.clone(), declaration.id);
        }
        tables.declarations.insert(declaration.id, declaration);
        Ok(())
    }

    fn get(&self, id: DeclarationId) -> Result<Declaration, RepositoryError> {
        self.tables
            .read()
            .declarations
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    fn commit(
        &self,
        declaration: &Declaration,
        audit: Option<AuditEntry>,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write();
        let previous_number = match tables.declarations.get(&declaration.id) {
            Some(stored) => stored.confirmation_number.clone(),
            None => return Err(RepositoryError::NotFound(declaration.id)),
        };

        // All checks before any write.
        if let Some(number) = &declaration.confirmation_number {
            match tables.confirmations.get(number) {
                Some(holder) if *holder != declaration.id => {
                    return Err(RepositoryError::DuplicateConfirmationNumber {
                        number: number.clone(),
                        holder: *holder,
                    });
                }
                _ => {}
            }
        }

        if previous_number != declaration.confirmation_number {
            if let Some(old) = previous_number {
                tables.confirmations.remove(&old);
            }
            if let Some(number) = &declaration.confirmation_number {
                tables.confirmations.insert(number.clone(), declaration.id);
            }
        }
        tables.declarations.insert(declaration.id, declaration.clone());
        if let Some(entry) = audit {
            tables.audit.entry(declaration.id).or_default().push(entry);
        }
        Ok(())
    }

    fn audit_trail(&self, id: DeclarationId) -> Result<Vec<AuditEntry>, RepositoryError> {
        let tables = self.tables.read();
        if !tables.declarations.contains_key(&id) {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(tables.audit.get(&id).cloned().unwrap_or_default())
    }

    fn awaiting_outcome(&self) -> Vec<DeclarationId> {
        let tables = self.tables.read();
        let mut awaiting: Vec<&Declaration> = tables
            .declarations
            .values()
            .filter(|d| d.status.is_awaiting_outcome())
            .collect();
        awaiting.sort_by_key(|d| (d.updated_at, d.id));
        awaiting.into_iter().map(|d| d.id).collect()
    }

    fn due_retries(&self, now: DateTime<Utc>) -> Vec<DeclarationId> {
        let tables = self.tables.read();
        let mut due: Vec<(DateTime<Utc>, DeclarationId)> = tables
            .declarations
            .values()
            .filter(|d| d.status == DeclarationStatus::RetryPending)
            .filter_map(|d| d.next_retry_at.map(|at| (at, d.id)))
            .filter(|(at, _)| *at <= now)
            .collect();
        due.sort();
        due.into_iter().map(|(_, id)| id).collect()
    }

    fn find_by_confirmation_number(&self, number: &str) -> Option<Declaration> {
        let tables = self.tables.read();
        let id = tables.confirmations.get(number)?;
        tables.declarations.get(id).cloned()
    }

    fn list(&self, status: Option<DeclarationStatus>) -> Vec<Declaration> {
        let tables = self.tables.read();
        let mut out: Vec<Declaration> = tables
            .declarations
            .values()
            .filter(|d| status.map_or(true, |s| d.status == s))
            .cloned()
            .collect();
        out.sort_by_key(|d| (d.created_at, d.id));
        out
    }
}
