use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque tenant identifier. A tenant owns exactly one document collection
/// and one upload area; every storage path is keyed by this id, so the id is
/// restricted to filesystem-safe characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

#[derive(Debug, thiserror::Error)]
pub enum InvalidTenant {
    #[error("missing tenant")]
    Empty,

    #[error("tenant id contains invalid character: {0:?}")]
    InvalidChar(char),
}

impl TenantId {
    /// # Errors
    ///
    /// Returns an error if the id is empty or contains characters outside
    /// `[A-Za-z0-9._-]`.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidTenant> {
        let id = id.into();
        if id.is_empty() {
            return Err(InvalidTenant::Empty);
        }
        if let Some(c) = id
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '-' | '_' | '.'))
        {
            return Err(InvalidTenant::InvalidChar(c));
        }
        Ok(Self(id))
    }

    /// Generate a fresh random tenant id.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TenantId {
    type Error = InvalidTenant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TenantId> for String {
    fn from(value: TenantId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_ids() {
        assert!(TenantId::new("team-42").is_ok());
        assert!(TenantId::new("a.b_c").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(TenantId::new(""), Err(InvalidTenant::Empty)));
    }

    #[test]
    fn rejects_path_separators() {
        assert!(TenantId::new("../escape").is_err());
        assert!(TenantId::new("a/b").is_err());
        assert!(TenantId::new("a\\b").is_err());
    }

    #[test]
    fn generated_ids_are_valid_and_unique() {
        let a = TenantId::generate();
        let b = TenantId::generate();
        assert_ne!(a, b);
        assert!(TenantId::new(a.as_str()).is_ok());
    }

    #[test]
    fn serde_roundtrip() {
        let tenant = TenantId::new("team-42").unwrap();
        let json = serde_json::to_string(&tenant).unwrap();
        assert_eq!(json, "\"team-42\"");
        let back: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tenant);
    }

    #[test]
    fn serde_rejects_invalid() {
        let result: Result<TenantId, _> = serde_json::from_str("\"a/b\"");
        assert!(result.is_err());
    }
}
