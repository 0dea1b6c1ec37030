//! Record store operations over `RecordStoreState`.
//!
//! # Responsibility
//! - Provide create/toggle/delete and the read-side filters.
//! - Keep `next_id` monotonic across deletes.
//!
//! # Invariants
//! - All ids in `records` are pairwise distinct.
//! - `next_id` is strictly greater than every id ever issued.
//! - Callers trigger persistence; the store never touches storage.

use crate::model::user::{Role, UserId, UserRecord, UserValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// First id handed out by an empty store.
pub const FIRST_USER_ID: UserId = 1;

pub type StoreResult<T> = Result<T, StoreError>;

/// Recoverable store-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(UserValidationError),
    NotFound(UserId),
    /// Counter reached `UserId::MAX`; no further id can be issued.
    IdsExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::IdsExhausted => write!(f, "user id counter is exhausted"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) | Self::IdsExhausted => None,
        }
    }
}

impl From<UserValidationError> for StoreError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Full restorable state of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStoreState {
    pub records: Vec<UserRecord>,
    pub next_id: UserId,
}

impl Default for RecordStoreState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: FIRST_USER_ID,
        }
    }
}

/// Authoritative holder of user records.
#[derive(Debug, Default)]
pub struct UserStore {
    state: RecordStoreState,
}

impl UserStore {
    /// Creates an empty store whose first id is `1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps previously restored state.
    ///
    /// The state is trusted as-is; the persistence layer checks structure
    /// before handing it over.
    pub fn from_state(state: RecordStoreState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &RecordStoreState {
        &self.state
    }

    pub fn next_id(&self) -> UserId {
        self.state.next_id
    }

    pub fn len(&self) -> usize {
        self.state.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.records.is_empty()
    }

    /// Validates input, issues the next id and appends an active record.
    ///
    /// # Errors
    /// - `StoreError::Validation` for empty fields or an email without `@`.
    /// - `StoreError::IdsExhausted` when the counter cannot advance.
    ///
    /// The counter is not advanced on failure.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> StoreResult<UserRecord> {
        let record = UserRecord::new(self.state.next_id, name, email, role)?;
        let next_id = self
            .state
            .next_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted)?;
        self.state.next_id = next_id;
        self.state.records.push(record.clone());
        Ok(record)
    }

    /// All records in insertion order.
    pub fn list(&self) -> &[UserRecord] {
        &self.state.records
    }

    pub fn filter_active(&self) -> Vec<&UserRecord> {
        self.state
            .records
            .iter()
            .filter(|user| user.is_active)
            .collect()
    }

    pub fn filter_by_role(&self, role: Role) -> Vec<&UserRecord> {
        self.state
            .records
            .iter()
            .filter(|user| user.role == role)
            .collect()
    }

    /// Case-insensitive substring search over name and email.
    ///
    /// An empty `term` matches every record.
    pub fn search(&self, term: &str) -> Vec<&UserRecord> {
        let needle = term.to_lowercase();
        self.state
            .records
            .iter()
            .filter(|user| user.matches_lowercase(&needle))
            .collect()
    }

    /// Flips `is_active` on the record with `id`.
    ///
    /// # Errors
    /// - `StoreError::NotFound(id)` when no record matches.
    pub fn toggle_active(&mut self, id: UserId) -> StoreResult<&UserRecord> {
        let user = self
            .state
            .records
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(StoreError::NotFound(id))?;
        user.toggle_active();
        Ok(&*user)
    }

    /// Removes the first record with `id`; returns whether one was removed.
    pub fn delete(&mut self, id: UserId) -> bool {
        match self.state.records.iter().position(|user| user.id == id) {
            Some(index) => {
                self.state.records.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn find_by_id(&self, id: UserId) -> Option<&UserRecord> {
        self.state.records.iter().find(|user| user.id == id)
    }

    /// Names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.state
            .records
            .iter()
            .map(|user| user.name.as_str())
            .collect()
    }

    pub fn first_active(&self) -> Option<&UserRecord> {
        self.state.records.iter().find(|user| user.is_active)
    }
}
