/// Role guard, layered inside session auth.
///
/// Reads the already-resolved `CurrentUser` and applies the role gate; a
/// missing context means the guard was mounted without session auth, which
/// is rejected the same way as an unauthenticated request.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::error::{AppError, AuthError};
use crate::middleware::CurrentUser;
use crate::roles::Role;

pub struct RequireRole {
    required: Role,
}

impl RequireRole {
    pub fn new(required: Role) -> Self {
        Self { required }
    }

    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    pub fn super_admin() -> Self {
        Self::new(Role::SuperAdmin)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireRoleService {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

pub struct RequireRoleService<S> {
    service: Rc<S>,
    required: Role,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
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
        let required = self.required;
        let acting_role = req
            .extensions()
            .get::<CurrentUser>()
            .map(|user| user.claims.role);

        Box::pin(async move {
            match acting_role {
                None => Err(AppError::Auth(AuthError::MissingToken).into()),
                Some(role) if !role.allows(required) => {
                    tracing::warn!(required = ?required, acting = ?role, "Role gate rejected request");
                    Err(AppError::Auth(AuthError::Forbidden).into())
                }
                Some(_) => service.call(req).await,
            }
        })
    }
}
