/// Middleware for the three auth contracts:
/// - required session auth (resolves `CurrentUser` or 401)
/// - optional bearer auth (resolves `ApiTokenContext` when a valid bearer is
///   present, passes through when absent)
/// - required bearer auth (403 when no `ApiTokenContext` was resolved)
/// plus role guards layered on top of session auth.

mod api_token;
mod role_guard;
mod session_auth;

pub use api_token::ApiTokenContext;
pub use api_token::OptionalApiToken;
pub use api_token::RequireApiToken;
pub use role_guard::RequireRole;
pub use session_auth::CurrentUser;
pub use session_auth::SessionAuth;

use actix_web::dev::ServiceRequest;

/// Extracts the bearer token from the Authorization header, if any.
pub(crate) fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}
