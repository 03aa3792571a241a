//! Remote verification status

use crate::error::StatusError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account whose verification is being tracked
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Body of a status response
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
}

/// Source of truth for an account's verification status
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn check(&self, account: &AccountId) -> Result<StatusReport, StatusError>;
}
