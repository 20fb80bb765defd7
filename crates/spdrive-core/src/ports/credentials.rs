//! Credential provider port
//!
//! Request execution fetches a bearer token through this trait before
//! every attempt, so a token refreshed between retries is picked up
//! without restarting the operation.

use async_trait::async_trait;

use crate::domain::errors::TransferError;

/// Supplies bearer tokens for authenticating remote requests
#[async_trait]
pub trait ICredentialProvider: Send + Sync {
    /// Returns a currently valid bearer token
    ///
    /// Implementations may cache and refresh internally; callers treat
    /// every returned token as usable for exactly one attempt.
    async fn bearer_token(&self) -> Result<String, TransferError>;
}

/// Provider that always returns one fixed token
///
/// Intended for tests and for callers that obtained a token elsewhere.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl ICredentialProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String, TransferError> {
        Ok(self.token.clone())
    }
}
