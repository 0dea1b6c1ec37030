//! Store-state codec over a `SlotStore`.
//!
//! # Responsibility
//! - Serialize `RecordStoreState` into the `users` and `userIdCounter` slots.
//! - Restore state at startup and reject structurally broken data.
//!
//! # Invariants
//! - `load` after `save(state)` yields `state` when nothing else wrote the
//!   slots in between.
//! - Both slots are written in one medium transaction.
//! - Restored state always has distinct positive ids and a counter above
//!   every stored id.

use super::slots::SlotStore;
use crate::db::DbError;
use crate::model::user::{UserId, UserRecord};
use crate::store::user_store::{RecordStoreState, FIRST_USER_ID};
use log::{debug, error, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot holding the JSON-encoded record array.
pub const USERS_SLOT: &str = "users";
/// Slot holding the next id as decimal text.
pub const COUNTER_SLOT: &str = "userIdCounter";

pub type PersistResult<T> = Result<T, PersistenceError>;

#[derive(Debug)]
pub enum PersistenceError {
    /// Medium refused the write (read-only, full, locked...).
    WriteFailed(DbError),
    /// Medium could not be read at all.
    ReadFailed(DbError),
    /// State could not be encoded; nothing was written.
    EncodeFailed(serde_json::Error),
    /// Slots exist but do not decode into a valid state.
    CorruptState(String),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WriteFailed(err) => write!(f, "failed to save user state: {err}"),
            Self::ReadFailed(err) => write!(f, "failed to read user state: {err}"),
            Self::EncodeFailed(err) => write!(f, "failed to encode user state: {err}"),
            Self::CorruptState(message) => write!(f, "corrupt persisted user state: {message}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::WriteFailed(err) | Self::ReadFailed(err) => Some(err),
            Self::EncodeFailed(err) => Some(err),
            Self::CorruptState(_) => None,
        }
    }
}

/// Stateless save/load adapter.
pub struct PersistenceAdapter<S: SlotStore> {
    slots: S,
}

impl<S: SlotStore> PersistenceAdapter<S> {
    pub fn new(slots: S) -> Self {
        Self { slots }
    }

    /// Writes the full state into both slots.
    ///
    /// # Errors
    /// - `EncodeFailed` when the records cannot be serialized.
    /// - `WriteFailed` when the medium rejects the write.
    ///
    /// Nothing is partially written in either case.
    pub fn save(&self, state: &RecordStoreState) -> PersistResult<()> {
        let users = serde_json::to_string(&state.records).map_err(|err| {
            error!("event=state_save module=persist status=error stage=encode error={err}");
            PersistenceError::EncodeFailed(err)
        })?;
        let counter = state.next_id.to_string();

        self.slots
            .write_slots(&[(USERS_SLOT, users.as_str()), (COUNTER_SLOT, counter.as_str())])
            .map_err(|err| {
                error!(
                    "event=state_save module=persist status=error read_only={} error={err}",
                    err.is_read_only()
                );
                PersistenceError::WriteFailed(err)
            })?;

        debug!(
            "event=state_save module=persist status=ok records={} next_id={}",
            state.records.len(),
            state.next_id
        );
        Ok(())
    }

    /// Reads and checks persisted state.
    ///
    /// - A slot holding `""` counts as absent.
    /// - Neither slot present: empty state.
    /// - Records without counter: counter derived as max id + 1.
    /// - Counter without records: empty records, stored counter kept.
    ///
    /// # Errors
    /// - `ReadFailed` when the medium cannot be queried.
    /// - `CorruptState` for bad JSON, a non-integer counter, zero or
    ///   duplicate ids, a counter not above the highest id, or a missing
    ///   counter that cannot be derived because the highest id is
    ///   `UserId::MAX`.
    pub fn load(&self) -> PersistResult<RecordStoreState> {
        let users = self.read(USERS_SLOT)?;
        let counter = self.read(COUNTER_SLOT)?;

        let records: Vec<UserRecord> = match users {
            Some(text) => serde_json::from_str(&text).map_err(|err| {
                PersistenceError::CorruptState(format!("`{USERS_SLOT}` is not a record array: {err}"))
            })?,
            None => Vec::new(),
        };
        let max_id = check_ids(&records)?;

        let next_id = match counter {
            Some(text) => parse_counter(&text)?,
            None => {
                let derived = max_id.checked_add(1).ok_or_else(|| {
                    PersistenceError::CorruptState(format!(
                        "`{COUNTER_SLOT}` is missing and highest id {max_id} leaves no next id"
                    ))
                })?;
                if !records.is_empty() {
                    warn!(
                        "event=state_load module=persist status=degraded reason=missing_counter derived_next_id={derived}"
                    );
                }
                derived
            }
        };

        if next_id <= max_id {
            return Err(PersistenceError::CorruptState(format!(
                "`{COUNTER_SLOT}` value {next_id} does not exceed highest id {max_id}"
            )));
        }

        debug!(
            "event=state_load module=persist status=ok records={} next_id={next_id}",
            records.len()
        );
        Ok(RecordStoreState { records, next_id })
    }

    fn read(&self, key: &str) -> PersistResult<Option<String>> {
        let value = self.slots.read_slot(key).map_err(|err| {
            error!("event=state_load module=persist status=error slot={key} error={err}");
            PersistenceError::ReadFailed(err)
        })?;
        Ok(value.filter(|text| !text.is_empty()))
    }
}

/// Returns the highest id, or `FIRST_USER_ID - 1` for no records.
fn check_ids(records: &[UserRecord]) -> PersistResult<UserId> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut max_id = FIRST_USER_ID - 1;
    for record in records {
        if record.id < FIRST_USER_ID {
            return Err(PersistenceError::CorruptState(format!(
                "record id {} is below {FIRST_USER_ID}",
                record.id
            )));
        }
        if !seen.insert(record.id) {
            return Err(PersistenceError::CorruptState(format!(
                "duplicate record id {}",
                record.id
            )));
        }
        max_id = max_id.max(record.id);
    }
    Ok(max_id)
}

fn parse_counter(text: &str) -> PersistResult<UserId> {
    text.trim().parse::<UserId>().map_err(|_| {
        PersistenceError::CorruptState(format!("`{COUNTER_SLOT}` is not an integer: `{text}`"))
    })
}
