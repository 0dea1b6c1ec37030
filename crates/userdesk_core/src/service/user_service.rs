//! User management service: store + persistence + delayed lookup.
//!
//! # Responsibility
//! - Restore state at startup, falling back to an empty store when the
//!   persisted state is unreadable.
//! - Flush state after each successful mutation.
//!
//! # Invariants
//! - A failed flush never rolls back the in-memory mutation.
//! - Persistence failures are logged, never returned to mutation callers.
//! - Reads always observe post-mutation state.

use crate::lookup::{DelayedLookup, LookupError, LookupResult, DEFAULT_LOOKUP_DELAY};
use crate::model::user::{Role, UserId, UserRecord};
use crate::persist::{PersistenceAdapter, PersistenceError, SlotStore};
use crate::store::user_store::{RecordStoreState, StoreResult, UserStore};
use log::{error, info, warn};
use std::time::Duration;

/// Tunables for `UserService`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Delay before a delayed lookup settles.
    pub lookup_delay: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            lookup_delay: DEFAULT_LOOKUP_DELAY,
        }
    }
}

/// How the service obtained its initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupState {
    /// No persisted state existed.
    Fresh,
    /// Persisted state was restored.
    Restored,
    /// Persisted state was unreadable; started empty.
    Recovered,
}

pub struct UserService<S: SlotStore> {
    store: UserStore,
    adapter: PersistenceAdapter<S>,
    lookup: DelayedLookup,
    startup: StartupState,
    last_flush_ok: bool,
}

impl<S: SlotStore> UserService<S> {
    /// Loads persisted state through `slots`.
    ///
    /// Never fails: corrupt or unreadable state is logged and replaced by an
    /// empty store. Nothing is written until the first mutation.
    pub fn open(slots: S, config: ServiceConfig) -> Self {
        let adapter = PersistenceAdapter::new(slots);
        let (store, startup) = match adapter.load() {
            Ok(state) if state == RecordStoreState::default() => {
                (UserStore::from_state(state), StartupState::Fresh)
            }
            Ok(state) => (UserStore::from_state(state), StartupState::Restored),
            Err(err) => {
                warn!("event=service_open module=service status=recovered error={err}");
                (UserStore::new(), StartupState::Recovered)
            }
        };

        info!(
            "event=service_open module=service status=ok startup={startup:?} records={} next_id={}",
            store.len(),
            store.next_id()
        );

        Self {
            store,
            adapter,
            lookup: DelayedLookup::new(config.lookup_delay),
            startup,
            last_flush_ok: true,
        }
    }

    pub fn startup_state(&self) -> StartupState {
        self.startup
    }

    /// Read-only view for list/filter/search/find.
    pub fn store(&self) -> &UserStore {
        &self.store
    }

    /// Whether the most recent flush reached the medium.
    pub fn last_flush_ok(&self) -> bool {
        self.last_flush_ok
    }

    /// Creates a record and flushes.
    ///
    /// # Errors
    /// - `StoreError::Validation`; nothing is flushed in that case.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> StoreResult<UserRecord> {
        let user = self.store.create(name, email, role).inspect_err(|err| {
            info!("event=user_create module=service status=rejected error={err}");
        })?;
        self.flush();
        info!(
            "event=user_create module=service status=ok id={} role={}",
            user.id, user.role
        );
        Ok(user)
    }

    /// Flips a record's active flag and flushes.
    ///
    /// # Errors
    /// - `StoreError::NotFound(id)`; nothing is flushed in that case.
    pub fn toggle_active(&mut self, id: UserId) -> StoreResult<UserRecord> {
        let user = match self.store.toggle_active(id) {
            Ok(user) => user.clone(),
            Err(err) => {
                warn!("event=user_toggle module=service status=error error={err}");
                return Err(err);
            }
        };
        self.flush();
        info!(
            "event=user_toggle module=service status=ok id={id} active={}",
            user.is_active
        );
        Ok(user)
    }

    /// Deletes a record and flushes when one was removed.
    pub fn delete(&mut self, id: UserId) -> bool {
        let removed = self.store.delete(id);
        if removed {
            self.flush();
            info!("event=user_delete module=service status=ok id={id}");
        } else {
            info!("event=user_delete module=service status=missing id={id}");
        }
        removed
    }

    /// Writes current state; logs and swallows medium failures.
    ///
    /// Returns whether the write succeeded.
    pub fn flush(&mut self) -> bool {
        self.last_flush_ok = match self.adapter.save(self.store.state()) {
            Ok(()) => true,
            Err(err) => {
                log_flush_failure(&err);
                false
            }
        };
        self.last_flush_ok
    }

    /// Delayed lookup, awaited directly.
    ///
    /// # Errors
    /// - `LookupError::EmptyStore` without waiting when there are no records.
    /// - `LookupError::NotFound(id)` after the delay.
    pub async fn lookup(&self, id: UserId) -> LookupResult<UserRecord> {
        if self.store.is_empty() {
            return Err(LookupError::EmptyStore);
        }
        info!("event=user_lookup module=service status=start id={id}");
        let result = self.lookup.fetch(self.store.list(), id).await;
        log_lookup(id, result.as_ref().err());
        result
    }

    /// Delayed lookup, continuation style. Settles exactly like [`lookup`](Self::lookup).
    pub async fn lookup_then<T, F, M>(&self, id: UserId, on_found: F, on_missing: M) -> T
    where
        F: FnOnce(UserRecord) -> T,
        M: FnOnce(LookupError) -> T,
    {
        if self.store.is_empty() {
            return on_missing(LookupError::EmptyStore);
        }
        info!("event=user_lookup module=service status=start id={id}");
        self.lookup
            .fetch_then(
                self.store.list(),
                id,
                |user| {
                    log_lookup(id, None);
                    on_found(user)
                },
                |err| {
                    log_lookup(id, Some(&err));
                    on_missing(err)
                },
            )
            .await
    }
}

fn log_flush_failure(err: &PersistenceError) {
    error!("event=state_flush module=service status=error continuing=in_memory error={err}");
}

fn log_lookup(id: UserId, failure: Option<&LookupError>) {
    match failure {
        None => info!("event=user_lookup module=service status=ok id={id}"),
        Some(err) => warn!("event=user_lookup module=service status=error id={id} error={err}"),
    }
}
