/// Required session authentication.
///
/// Validates the bearer session token (signature, expiry, ledger membership)
/// and injects a `CurrentUser` into request extensions. Rejects with 401
/// otherwise; expiry is distinguishable in the response code, a revoked
/// token is not.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::{SessionClaims, TokenService};
use crate::error::{AppError, AuthError};

/// The verified identity of the session driving the current request,
/// together with the raw token (logout and delete-account revoke it).
#[derive(Clone)]
pub struct CurrentUser {
    pub claims: SessionClaims,
    pub token: String,
}

impl CurrentUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        self.claims.user_id()
    }
}

pub struct SessionAuth {
    tokens: TokenService,
}

impl SessionAuth {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(SessionAuthService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct SessionAuthService<S> {
    service: Rc<S>,
    tokens: TokenService,
}

impl<S, B> Service<ServiceRequest> for SessionAuthService<S>
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
        let tokens = self.tokens.clone();
        let service = self.service.clone();

        Box::pin(async move {
            let token = match super::bearer_token(&req) {
                Some(token) => token,
                None => {
                    tracing::warn!("Missing or invalid Authorization header");
                    return Err(AppError::Auth(AuthError::MissingToken).into());
                }
            };

            match tokens.verify_session_token(&token).await {
                Ok(claims) => {
                    tracing::debug!(user_id = %claims.sub, "Session token validated");
                    req.extensions_mut().insert(CurrentUser { claims, token });
                    service.call(req).await
                }
                Err(e) => Err(e.into()),
            }
        })
    }
}
