/// Bearer (API token) middleware pair.
///
/// `OptionalApiToken` resolves an `ApiTokenContext` when a valid bearer is
/// present and lets the request through untouched when the header is absent.
/// A header that is present but invalid is a 401: the client tried to
/// authenticate and failed. `RequireApiToken` sits inside it and turns a
/// missing context into a 403.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::TokenService;
use crate::error::{AppError, AuthError};

/// Resolved machine-client identity for the current request.
#[derive(Clone)]
pub struct ApiTokenContext {
    pub user_id: Uuid,
}

pub struct OptionalApiToken {
    tokens: TokenService,
}

impl OptionalApiToken {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for OptionalApiToken
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = OptionalApiTokenService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(OptionalApiTokenService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct OptionalApiTokenService<S> {
    service: Rc<S>,
    tokens: TokenService,
}

impl<S, B> Service<ServiceRequest> for OptionalApiTokenService<S>
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
        let service = self.service.clone();

        let resolved = match super::bearer_token(&req) {
            None => None,
            Some(token) => match self.tokens.verify_api_token(&token) {
                Some(user_id) => Some(ApiTokenContext { user_id }),
                None => {
                    tracing::warn!("Rejecting invalid API token bearer");
                    return Box::pin(async move {
                        Err(AppError::Auth(AuthError::TokenInvalid).into())
                    });
                }
            },
        };

        if let Some(context) = resolved {
            req.extensions_mut().insert(context);
        }
        Box::pin(async move { service.call(req).await })
    }
}

/// Rejects requests for which no `ApiTokenContext` was resolved.
pub struct RequireApiToken;

impl<S, B> Transform<S, ServiceRequest> for RequireApiToken
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireApiTokenService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireApiTokenService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireApiTokenService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireApiTokenService<S>
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
        let service = self.service.clone();
        let authenticated = req.extensions().get::<ApiTokenContext>().is_some();

        Box::pin(async move {
            if !authenticated {
                return Err(AppError::Auth(AuthError::Forbidden).into());
            }
            service.call(req).await
        })
    }
}
