//! User domain model.
//!
//! # Responsibility
//! - Define the record shape shared by the store, persistence and callers.
//!
//! # Invariants
//! - Every record is identified by a `UserId` issued by the store.
//! - Deletion is a hard delete; ids are still never reissued.

pub mod user;
