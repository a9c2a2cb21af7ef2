/// API-token routes. Creation and deletion are session-authenticated; the
/// `whoami` probe runs behind the bearer-auth middleware pair instead and
/// reports the identity the bearer resolved to.

use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::api_tokens::ApiTokenManager;
use crate::error::{AppError, AuthError};
use crate::middleware::ApiTokenContext;
use crate::routes::users::current_user;
use crate::validators::is_valid_token_name;

#[derive(Deserialize, Default)]
pub struct CreateApiTokenRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// POST /users/api_token/create
pub async fn create_api_token(
    req: HttpRequest,
    form: Option<web::Json<CreateApiTokenRequest>>,
    api_tokens: web::Data<ApiTokenManager>,
) -> Result<HttpResponse, AppError> {
    let current = current_user(&req)?;
    let requested = form
        .map(|f| f.into_inner())
        .unwrap_or_default()
        .name
        .unwrap_or_default();
    let name = is_valid_token_name(&requested)?;

    let entry = api_tokens.create(current.user_id()?, &name).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Api token created successfully",
        "token": entry.token,
        "name": entry.name
    })))
}

/// GET /users/api_token/list
pub async fn list_api_tokens(
    req: HttpRequest,
    api_tokens: web::Data<ApiTokenManager>,
) -> Result<HttpResponse, AppError> {
    let current = current_user(&req)?;

    let entries = api_tokens.list(current.user_id()?).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "api_tokens": entries
    })))
}

/// DELETE /users/api_token/{token}
///
/// # Errors
/// - 401 "Invalid token" when the path token fails validation or belongs to
///   a different user
pub async fn delete_api_token(
    req: HttpRequest,
    path: web::Path<String>,
    api_tokens: web::Data<ApiTokenManager>,
) -> Result<HttpResponse, AppError> {
    let current = current_user(&req)?;
    let token = path.into_inner();

    let deleted = api_tokens.delete_one(current.user_id()?, &token).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Api token deleted successfully",
        "deleted_api_token": deleted
    })))
}

/// DELETE /users/api_token/all
pub async fn delete_all_api_tokens(
    req: HttpRequest,
    api_tokens: web::Data<ApiTokenManager>,
) -> Result<HttpResponse, AppError> {
    let current = current_user(&req)?;

    api_tokens.delete_all(current.user_id()?).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "All api tokens deleted successfully"
    })))
}

/// GET /api/whoami
///
/// Exercises the bearer contract: reachable only with a valid API token.
pub async fn whoami(req: HttpRequest) -> Result<HttpResponse, AppError> {
    let context = req
        .extensions()
        .get::<ApiTokenContext>()
        .cloned()
        .ok_or(AppError::Auth(AuthError::Forbidden))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user_id": context.user_id.to_string()
    })))
}
