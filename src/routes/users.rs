/// Sample protected routes sitting behind the token and role gates.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::auth::AccessClaims;
use crate::error::AppError;
use crate::store::UserStore;

#[derive(Serialize)]
pub struct UserSummary {
    pub username: String,
    pub roles: Vec<String>,
}

/// GET /api/me
///
/// Echoes the identity decoded from the caller's access token. Claims are
/// injected by `RequireAuth`.
pub async fn me(claims: web::ReqData<AccessClaims>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(UserSummary {
        username: claims.sub.clone(),
        roles: claims.roles.clone(),
    }))
}

/// GET /api/users
///
/// Lists registered users. Gated to Admin/Editor roles; password hashes
/// and refresh tokens never leave the store.
pub async fn list_users(store: web::Data<UserStore>) -> Result<HttpResponse, AppError> {
    let users: Vec<UserSummary> = store
        .snapshot()
        .await
        .into_iter()
        .map(|u| UserSummary {
            username: u.username,
            roles: u.roles,
        })
        .collect();

    Ok(HttpResponse::Ok().json(users))
}
