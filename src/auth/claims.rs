/// JWT claims payloads
///
/// Two token classes with distinct payloads: access tokens carry the
/// username and roles, refresh tokens carry only the username. Both follow
/// the standard registered claims (RFC 7519) for expiry, issue time, and
/// issuer.

use serde::{Deserialize, Serialize};

/// Claims for short-lived access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (username)
    pub sub: String,
    /// Role labels for coarse authorization checks
    pub roles: Vec<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl AccessClaims {
    pub fn new(username: String, roles: Vec<String>, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: username,
            roles,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }

}

/// Claims for longer-lived refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    /// Subject (username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl RefreshClaims {
    pub fn new(username: String, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: username,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_claims_carry_identity_and_roles() {
        let claims = AccessClaims::new(
            "walt".to_string(),
            vec!["Admin".to_string(), "Editor".to_string()],
            30,
            "authgate".to_string(),
        );

        assert_eq!(claims.sub, "walt");
        assert_eq!(claims.roles, vec!["Admin", "Editor"]);
        assert_eq!(claims.iss, "authgate");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_claims_carry_username_only() {
        let claims = RefreshClaims::new("walt".to_string(), 86400, "authgate".to_string());
        assert_eq!(claims.sub, "walt");
        assert!(claims.exp > claims.iat);
    }
}
