use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

/// Authenticated submitter.
///
/// `isid` owns every file, tracker key and blob path the caller creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub isid: String,
    pub method: String,
    /// May start and stop the worker loop.
    #[serde(default)]
    pub admin: bool,
    pub claims: HashMap<String, serde_json::Value>,
}

impl Identity {
    pub fn new(isid: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            isid: isid.into(),
            method: method.into(),
            admin: false,
            claims: HashMap::new(),
        }
    }

    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    /// The single caller of an unauthenticated deployment; it operates the worker too.
    pub fn anonymous() -> Self {
        Self::new("anonymous", "none").with_admin(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_identity() {
        let identity = Identity::anonymous();
        assert_eq!(identity.isid, "anonymous");
        assert_eq!(identity.method, "none");
        assert!(identity.admin);
        assert!(identity.claims.is_empty());
    }

    #[test]
    fn test_identity_serialization() {
        let mut identity = Identity::new("u1", "api_key");
        identity
            .claims
            .insert("team".to_string(), serde_json::json!("legal"));

        let json = serde_json::to_string(&identity).unwrap();
        let deserialized: Identity = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.isid, "u1");
        assert!(!deserialized.admin);
        assert_eq!(deserialized.claims.get("team"), Some(&serde_json::json!("legal")));
    }
}
