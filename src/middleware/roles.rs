/// Role gate middleware
///
/// Authorizes an already-authenticated request against an allow-list of
/// roles: the request passes iff the decoded role set intersects the
/// allowed set. Matching is exact string membership, no hierarchy. Must
/// sit behind `RequireAuth`; if the auth context is absent the gate denies
/// with 401, which signals a wiring bug rather than a client error.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::AccessClaims;
use crate::error::{AppError, AuthError};

/// True iff at least one of `user_roles` appears in `allowed`.
pub fn has_permitted_role(user_roles: &[String], allowed: &[&str]) -> bool {
    user_roles.iter().any(|role| allowed.contains(&role.as_str()))
}

pub struct RequireRoles {
    allowed: Vec<&'static str>,
}

impl RequireRoles {
    pub fn any_of(allowed: &[&'static str]) -> Self {
        Self {
            allowed: allowed.to_vec(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRoles
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRolesService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireRolesService {
            service: Rc::new(service),
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct RequireRolesService<S> {
    service: Rc<S>,
    allowed: Vec<&'static str>,
}

impl<S, B> Service<ServiceRequest> for RequireRolesService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = req.extensions().get::<AccessClaims>().cloned();

        match claims {
            None => {
                // RequireAuth did not run upstream of this gate.
                tracing::error!(path = %req.path(), "Role gate reached without auth context");
                Box::pin(async move { Err(AppError::from(AuthError::MissingToken).into()) })
            }
            Some(claims) => {
                if has_permitted_role(&claims.roles, &self.allowed) {
                    let service = self.service.clone();
                    Box::pin(async move { service.call(req).await })
                } else {
                    tracing::warn!(
                        username = %claims.sub,
                        user_roles = ?claims.roles,
                        allowed = ?self.allowed,
                        "Role gate denied request"
                    );
                    Box::pin(async move { Err(AppError::from(AuthError::InsufficientRole).into()) })
                }
            }
        }
    }
}
