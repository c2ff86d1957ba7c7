/// Access-token middleware
///
/// Guards protected routes: requires a `Authorization: Bearer <token>`
/// header, verifies the token against the access secret, and injects the
/// decoded claims into request extensions for downstream handlers and the
/// role gate. A missing or malformed header answers 401; a token that
/// fails verification answers 403, with the precise failure kind logged
/// server-side only.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::decode_access_token;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

pub struct RequireAuth {
    jwt_config: JwtSettings,
}

impl RequireAuth {
    pub fn new(jwt_config: JwtSettings) -> Self {
        Self { jwt_config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireAuthService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
        }))
    }
}

pub struct RequireAuthService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
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
        let bearer_token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string);

        match bearer_token {
            None => {
                tracing::warn!("Missing or malformed Authorization header");
                Box::pin(async move { Err(AppError::from(AuthError::MissingToken).into()) })
            }
            Some(token) => match decode_access_token(&token, &self.jwt_config) {
                Ok(claims) => {
                    tracing::debug!(username = %claims.sub, "Access token verified");
                    req.extensions_mut().insert(claims);

                    let service = self.service.clone();
                    Box::pin(async move { service.call(req).await })
                }
                Err(e) => {
                    tracing::warn!(reason = %e, "Access token rejected");
                    Box::pin(async move { Err(AppError::from(AuthError::InvalidToken).into()) })
                }
            },
        }
    }
}
