//! Caller identity value object.
//!
//! The HTTP boundary resolves an identity and hands a [`UserId`] to every
//! pipeline call. Nothing downstream re-reads headers or query strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for UserId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| CoreError::InvalidUserId(trimmed.to_string()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_uuid_with_surrounding_whitespace() {
        let id: UserId = " 0b7a4e53-2c1f-4f6e-9d55-0a4e1c9b2f10 ".parse().unwrap();
        assert_eq!(id.to_string(), "0b7a4e53-2c1f-4f6e-9d55-0a4e1c9b2f10");
    }

    #[test]
    fn rejects_non_uuid() {
        let err = "alice".parse::<UserId>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidUserId(ref v) if v == "alice"));
    }
}
