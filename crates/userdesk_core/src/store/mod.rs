//! In-memory record store.
//!
//! # Responsibility
//! - Own the ordered user collection and the id counter.
//! - Be the only place records are created, mutated or removed.
//!
//! # Invariants
//! - Insertion order is the only ordering; nothing is sorted.
//! - Failed operations leave state untouched.

pub mod user_store;
