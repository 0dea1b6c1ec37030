//! User record model and creation-time validation.
//!
//! # Responsibility
//! - Define `UserRecord`, its `Role` label and the validation rules applied
//!   when a record is first created.
//!
//! # Invariants
//! - `id` is assigned by the store only; this module never invents ids.
//! - Email validity is checked at creation time and never again on read.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Numeric identifier issued by the store counter. Always `>= 1`.
pub type UserId = u64;

/// Closed set of role labels a record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Guest,
}

impl Role {
    /// Returns the stable lowercase label used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Guest => "guest",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a role label that is not in the fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl Display for UnknownRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown role `{}`; expected admin|user|guest", self.0)
    }
}

impl Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Parses an exact, case-sensitive role label.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "guest" => Ok(Self::Guest),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Input rejection raised before a record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserValidationError {
    /// Named field (`name` or `email`) was empty.
    MissingField(&'static str),
    /// Email does not contain `@`.
    InvalidEmail,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::InvalidEmail => write!(f, "email must contain `@`"),
        }
    }
}

impl Error for UserValidationError {}

/// One managed user entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Serialized as `isActive`.
    pub is_active: bool,
}

impl UserRecord {
    /// Builds an active record after checking creation-time rules.
    ///
    /// # Errors
    /// - `MissingField("name")` / `MissingField("email")` for empty input,
    ///   checked in that order.
    /// - `InvalidEmail` when `email` has no `@`.
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        let email = email.into();
        validate_fields(&name, &email)?;

        Ok(Self {
            id,
            name,
            email,
            role,
            is_active: true,
        })
    }

    /// Flips the active flag and returns the new value.
    pub fn toggle_active(&mut self) -> bool {
        self.is_active = !self.is_active;
        self.is_active
    }

    /// Case-insensitive substring match against name or email.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.email.to_lowercase().contains(needle)
    }
}

/// Applies the creation rules without building a record.
pub fn validate_fields(name: &str, email: &str) -> Result<(), UserValidationError> {
    if name.is_empty() {
        return Err(UserValidationError::MissingField("name"));
    }
    if email.is_empty() {
        return Err(UserValidationError::MissingField("email"));
    }
    if !email.contains('@') {
        return Err(UserValidationError::InvalidEmail);
    }
    Ok(())
}
