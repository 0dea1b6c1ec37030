//! Use-case services.
//!
//! # Responsibility
//! - Pair every store mutation with a persistence flush.
//! - Keep callers away from slot and codec details.

pub mod user_service;
