use async_trait::async_trait;
use thiserror::Error;

use super::types::{AuthRequest, Identity};

/// Why a caller could not be mapped to a submitter.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials were presented.
    #[error("Authentication required")]
    NotAuthenticated,

    /// Credentials were presented but match no configured submitter.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Authentication service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Resolves an incoming request to the submitter (isid) it acts for.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Identify the submitter behind `request`.
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;

    /// Config name of the method, as in `auth.method`.
    fn method_name(&self) -> &'static str;
}
