//! Delayed single-record lookup.
//!
//! One asynchronous implementation (`DelayedLookup::fetch`) exposed in two
//! calling conventions: direct `.await` on the result, or continuation
//! style via `fetch_then`. Both settle identically for the same input.

use crate::model::user::{UserId, UserRecord};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Delay applied before a lookup settles unless configured otherwise.
pub const DEFAULT_LOOKUP_DELAY: Duration = Duration::from_millis(1000);

pub type LookupResult<T> = Result<T, LookupError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    NotFound(UserId),
    /// Refused before scheduling because there is nothing to look up.
    EmptyStore,
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "User with ID {id} not found"),
            Self::EmptyStore => write!(f, "no users to look up; add some users first"),
        }
    }
}

impl Error for LookupError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayedLookup {
    delay: Duration,
}

impl Default for DelayedLookup {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_DELAY)
    }
}

impl DelayedLookup {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits for the configured delay, then resolves the record with `id`.
    ///
    /// # Errors
    /// - `LookupError::NotFound(id)` when no record matches after the delay.
    pub async fn fetch(&self, records: &[UserRecord], id: UserId) -> LookupResult<UserRecord> {
        tokio::time::sleep(self.delay).await;
        records
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or(LookupError::NotFound(id))
    }

    /// Continuation form of [`fetch`](Self::fetch).
    ///
    /// Runs exactly one of `on_found` / `on_missing` and returns its value.
    pub async fn fetch_then<T, F, M>(
        &self,
        records: &[UserRecord],
        id: UserId,
        on_found: F,
        on_missing: M,
    ) -> T
    where
        F: FnOnce(UserRecord) -> T,
        M: FnOnce(LookupError) -> T,
    {
        match self.fetch(records, id).await {
            Ok(user) => on_found(user),
            Err(err) => on_missing(err),
        }
    }
}
