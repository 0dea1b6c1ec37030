//! Persistence boundary between the record store and the storage medium.
//!
//! # Responsibility
//! - Model the medium as named text slots (`SlotStore`).
//! - Encode/decode full store state through `PersistenceAdapter`.
//!
//! # Invariants
//! - The adapter keeps no state between calls.
//! - Medium failures surface as `PersistenceError`, never as panics.

pub mod adapter;
pub mod slots;

pub use adapter::{
    PersistResult, PersistenceAdapter, PersistenceError, COUNTER_SLOT, USERS_SLOT,
};
pub use slots::{SlotStore, SqliteSlotStore};
