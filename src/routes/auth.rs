/// Session lifecycle handlers
///
/// Login, refresh, logout, and registration. These handlers are the only
/// place the store's refresh-token field is mutated; everything else
/// treats user records as read-only.
///
/// Session states per user: Anonymous -> Authenticated (live access token)
/// -> Refreshable (access expired, stored refresh token still live) ->
/// Anonymous again after logout or refresh-token expiry.

use actix_web::{
    cookie::{time::Duration, Cookie},
    web, HttpRequest, HttpResponse,
};
use serde::{Deserialize, Serialize};

use crate::auth::{
    decode_refresh_token, hash_password, issue_access_token, issue_refresh_token, roles,
    verify_password,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ValidationError};
use crate::store::{UserRecord, UserStore};

/// Cookie holding the refresh token, mirroring the stored copy.
const REFRESH_COOKIE: &str = "jwt";

const MIN_PASSWORD_LENGTH: usize = 8;
// bcrypt only keys from the first 72 bytes; longer input would silently
// truncate.
const MAX_PASSWORD_LENGTH: usize = 72;

const MAX_USERNAME_LENGTH: usize = 32;

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Login and registration request body: `{user, pwd}`
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pwd: String,
}

#[derive(Serialize)]
pub struct AccessTokenResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

fn require_credentials(form: &CredentialsRequest) -> Result<(), AppError> {
    if form.user.is_empty() {
        return Err(ValidationError::MissingField("user".to_string()).into());
    }
    if form.pwd.is_empty() {
        return Err(ValidationError::MissingField("pwd".to_string()).into());
    }
    Ok(())
}

fn refresh_cookie(token: &str, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, token.to_string())
        .http_only(true)
        .path("/")
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// Max-Age=0 tells the browser to delete the cookie; the clearing
/// lifetime carries no security meaning.
fn removal_cookie() -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, "")
        .http_only(true)
        .path("/")
        .max_age(Duration::ZERO)
        .finish()
}

/// POST /auth/register
///
/// Creates a user with a hashed password, the default `User` role, and no
/// active session.
///
/// # Errors
/// - 400: missing fields, malformed username, or password outside length
///   bounds
/// - 409: username already taken
/// - 500: hashing or persistence failure
pub async fn register(
    form: web::Json<CredentialsRequest>,
    store: web::Data<UserStore>,
) -> Result<HttpResponse, AppError> {
    require_credentials(&form)?;
    if form.user.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("user".to_string(), MAX_USERNAME_LENGTH).into());
    }
    if !is_valid_username(&form.user) {
        return Err(ValidationError::InvalidFormat("user".to_string()).into());
    }
    if form.pwd.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("pwd".to_string(), MIN_PASSWORD_LENGTH).into());
    }
    if form.pwd.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("pwd".to_string(), MAX_PASSWORD_LENGTH).into());
    }

    let password_hash = hash_password(&form.pwd)?;
    store
        .insert_user(UserRecord {
            username: form.user.clone(),
            password_hash,
            roles: vec![roles::USER.to_string()],
            refresh_token: String::new(),
        })
        .await?;

    tracing::info!(username = %form.user, "User registered");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": format!("New user {} was created", form.user)
    })))
}

/// POST /auth/login
///
/// Verifies credentials, then issues both token classes: the access token
/// goes back in the body, the refresh token is persisted on the user
/// record and mirrored to the client as an http-only cookie.
///
/// Unknown username and wrong password answer with the same 401 shape so
/// accounts cannot be enumerated.
///
/// # Errors
/// - 400: missing fields
/// - 401: unknown user or wrong password
/// - 500: hashing, signing, or persistence failure
pub async fn login(
    form: web::Json<CredentialsRequest>,
    store: web::Data<UserStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    require_credentials(&form)?;

    let user = store
        .find_by_username(&form.user)
        .await
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&form.pwd, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let access_token = issue_access_token(&user.username, &user.roles, &jwt_config)?;
    let refresh_token = issue_refresh_token(&user.username, &jwt_config)?;

    // The store write completes before this handler returns. A crash
    // between issuing and persisting would orphan the cookie; that window
    // is accepted, not eliminated.
    store
        .set_refresh_token(&user.username, &refresh_token)
        .await?;

    tracing::info!(username = %user.username, "User logged in");

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(
            &refresh_token,
            jwt_config.refresh_token_expiry,
        ))
        .json(AccessTokenResponse { access_token }))
}

/// GET /auth/refresh
///
/// Exchanges the refresh-token cookie for a fresh access token. The
/// refresh token itself is deliberately reused until logout or expiry; a
/// stolen cookie therefore stays valid for its whole lifetime, which is a
/// known weakness of this flow.
///
/// # Errors
/// - 401: no cookie
/// - 403: token unknown to the store, or stored state fails verification
pub async fn refresh(
    req: HttpRequest,
    store: web::Data<UserStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let cookie = req.cookie(REFRESH_COOKIE).ok_or(AuthError::MissingToken)?;
    let refresh_token = cookie.value().to_string();

    let user = store
        .find_by_refresh_token(&refresh_token)
        .await
        .ok_or(AuthError::StaleRefreshToken)?;

    match decode_refresh_token(&refresh_token, &jwt_config) {
        Ok(claims) if claims.sub == user.username => {
            let access_token = issue_access_token(&user.username, &user.roles, &jwt_config)?;
            tracing::debug!(username = %user.username, "Access token refreshed");
            Ok(HttpResponse::Ok().json(AccessTokenResponse { access_token }))
        }
        Ok(claims) => {
            // The stored token decodes to someone else: forged or stale
            // state. Revoke it so it cannot be retried.
            tracing::warn!(
                record = %user.username,
                token_subject = %claims.sub,
                "Stored refresh token does not match its record"
            );
            store.clear_refresh_token(&refresh_token).await?;
            Err(AuthError::StaleRefreshToken.into())
        }
        Err(e) => {
            tracing::warn!(username = %user.username, reason = %e, "Stored refresh token failed verification");
            store.clear_refresh_token(&refresh_token).await?;
            Err(AuthError::StaleRefreshToken.into())
        }
    }
}

/// GET /auth/logout
///
/// Revokes the session named by the cookie, if any. Always answers 204
/// and never reveals whether the token was live, unknown, or already
/// revoked.
pub async fn logout(
    req: HttpRequest,
    store: web::Data<UserStore>,
) -> Result<HttpResponse, AppError> {
    let cookie = match req.cookie(REFRESH_COOKIE) {
        // Nothing to revoke, nothing to clear.
        None => return Ok(HttpResponse::NoContent().finish()),
        Some(cookie) => cookie,
    };

    let revoked = store.clear_refresh_token(cookie.value()).await?;
    if revoked {
        tracing::info!("Session revoked");
    }

    Ok(HttpResponse::NoContent().cookie(removal_cookie()).finish())
}
