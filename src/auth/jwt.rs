/// JWT issuing and verification
///
/// Access and refresh tokens are signed with HS256 under independent
/// secrets taken from `JwtSettings`. Verification reports which of the
/// three failure kinds occurred (malformed, expired, bad signature) so the
/// caller can log the cause; callers map all three to an unauthenticated
/// response and never leak the distinction to the client.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::error::AppError;

/// Token verification failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Not a decodable JWT at all
    Malformed,
    /// Valid signature, expiry in the past
    Expired,
    /// Signature does not match the secret for this token class
    InvalidSignature,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::Expired => write!(f, "expired token"),
            TokenError::InvalidSignature => write!(f, "token signature mismatch"),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str, issuer: &str) -> Result<T, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    // Token lifetimes are short (30 s for access tokens); no clock leeway.
    validation.leeway = 0;

    decode::<T>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(TokenError::from)
}

/// Issue a short-lived access token carrying identity and roles
pub fn issue_access_token(
    username: &str,
    roles: &[String],
    config: &JwtSettings,
) -> Result<String, AppError> {
    let claims = AccessClaims::new(
        username.to_string(),
        roles.to_vec(),
        config.access_token_expiry,
        config.issuer.clone(),
    );
    sign(&claims, &config.access_secret)
}

/// Issue a longer-lived refresh token carrying identity only
pub fn issue_refresh_token(username: &str, config: &JwtSettings) -> Result<String, AppError> {
    let claims = RefreshClaims::new(
        username.to_string(),
        config.refresh_token_expiry,
        config.issuer.clone(),
    );
    sign(&claims, &config.refresh_secret)
}

/// Verify an access token against the access secret
pub fn decode_access_token(token: &str, config: &JwtSettings) -> Result<AccessClaims, TokenError> {
    verify(token, &config.access_secret, &config.issuer)
}

/// Verify a refresh token against the refresh secret
pub fn decode_refresh_token(
    token: &str,
    config: &JwtSettings,
) -> Result<RefreshClaims, TokenError> {
    verify(token, &config.refresh_secret, &config.issuer)
}
