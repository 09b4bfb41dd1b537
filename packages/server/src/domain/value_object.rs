//! Value objects for the chat domain.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Connection identity, unique for the lifetime of the process.
///
/// Usernames are mutable and only checked for uniqueness on `/setname`, so
/// everything that must survive a rename is keyed by this ID instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Generate a fresh random ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated username: non-empty and free of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Validate a requested username. Surrounding whitespace is trimmed first.
    pub fn new(value: &str) -> Result<Self, ValueObjectError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ValueObjectError::EmptyUsername);
        }
        if value.chars().any(char::is_whitespace) {
            return Err(ValueObjectError::UsernameContainsSpaces);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Room name, used both for display and as the lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(value: &str) -> Result<Self, ValueObjectError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ValueObjectError::EmptyRoomName);
        }
        if value.chars().any(char::is_whitespace) {
            return Err(ValueObjectError::RoomNameContainsSpaces);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for RoomName {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
