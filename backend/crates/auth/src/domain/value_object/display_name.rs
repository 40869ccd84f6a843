//! Display Name Value Object

use serde::Serialize;

use crate::error::{AuthError, AuthResult};

const DISPLAY_NAME_MAX_CHARS: usize = 100;

/// Human-readable account name, trimmed and non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(name: impl AsRef<str>) -> AuthResult<Self> {
        let name = name.as_ref().trim();

        if name.is_empty() {
            return Err(AuthError::Validation("Name cannot be empty".into()));
        }
        if name.chars().count() > DISPLAY_NAME_MAX_CHARS {
            return Err(AuthError::Validation(format!(
                "Name must be at most {DISPLAY_NAME_MAX_CHARS} characters"
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(AuthError::Validation(
                "Name contains invalid control characters".into(),
            ));
        }

        Ok(Self(name.to_string()))
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_db(self) -> String {
        self.0
    }
}

impl std::fmt::Display for DisplayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_trimmed() {
        assert_eq!(DisplayName::new("  Ada Lovelace ").unwrap().as_str(), "Ada Lovelace");
    }

    #[test]
    fn test_display_name_rejects_blank_and_long() {
        assert!(DisplayName::new("   ").is_err());
        assert!(DisplayName::new("x".repeat(101)).is_err());
        assert!(DisplayName::new("x".repeat(100)).is_ok());
        assert!(DisplayName::new("bad\u{0000}name").is_err());
    }
}
