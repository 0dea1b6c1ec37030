//! Core logic for userdesk: user records, their store and persistence.
//! This crate owns every record invariant; callers only render and forward.

pub mod db;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod persist;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use lookup::{DelayedLookup, LookupError, LookupResult, DEFAULT_LOOKUP_DELAY};
pub use model::user::{Role, UnknownRole, UserId, UserRecord, UserValidationError};
pub use persist::{
    PersistResult, PersistenceAdapter, PersistenceError, SlotStore, SqliteSlotStore,
    COUNTER_SLOT, USERS_SLOT,
};
pub use service::user_service::{ServiceConfig, StartupState, UserService};
pub use store::user_store::{RecordStoreState, StoreError, StoreResult, UserStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
