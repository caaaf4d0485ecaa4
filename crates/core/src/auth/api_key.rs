//! API key authentication.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};
use crate::config::ApiKeyEntry;

/// Authenticator that maps configured API keys to submitter identities.
///
/// Accepts the key in either:
/// - `Authorization: Bearer <key>` header
/// - `X-API-Key: <key>` header
pub struct ApiKeyAuthenticator {
    entries: Vec<ApiKeyEntry>,
}

impl ApiKeyAuthenticator {
    pub fn new(entries: Vec<ApiKeyEntry>) -> Self {
        Self { entries }
    }

    /// Extract API key from request headers.
    fn extract_key(request: &AuthRequest) -> Option<&str> {
        if let Some(auth_header) = request.headers.get("authorization") {
            if let Some(key) = auth_header
                .strip_prefix("Bearer ")
                .or_else(|| auth_header.strip_prefix("bearer "))
            {
                return Some(key.trim());
            }
        }

        request.headers.get("x-api-key").map(|k| k.trim())
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let provided = Self::extract_key(request).ok_or(AuthError::NotAuthenticated)?;

        // Compare against every entry so timing does not reveal which matched.
        let mut matched: Option<&ApiKeyEntry> = None;
        for entry in &self.entries {
            if constant_time_eq(provided.as_bytes(), entry.key.as_bytes()) && matched.is_none() {
                matched = Some(entry);
            }
        }

        match matched {
            Some(entry) => Ok(Identity::new(&entry.isid, "api_key").with_admin(entry.admin)),
            None => Err(AuthError::InvalidCredentials("Invalid API key".to_string())),
        }
    }

    fn method_name(&self) -> &'static str {
        "api_key"
    }
}

/// Constant-time byte comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
