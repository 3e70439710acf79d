//! Explicit user identity threaded through every ledger and session call

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProgressionError, Result};

/// Opaque user identifier supplied by the identity collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ProgressionError::invalid("user id is empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_trims_and_rejects_blank() {
        assert_eq!(UserId::new("  alice ").unwrap().as_str(), "alice");
        assert!(UserId::new("   ").is_err());
    }
}
