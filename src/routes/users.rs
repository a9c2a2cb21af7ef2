/// Account maintenance routes: delete account, change full name, change
/// password. All require session auth.

use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AuthError};
use crate::identity::User;
use crate::middleware::CurrentUser;
use crate::roles::Role;
use crate::sessions::SessionManager;
use crate::validators::is_valid_full_name;

/// Identity record as exposed over HTTP; the password hash never leaves
/// the service.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

pub(crate) fn current_user(req: &HttpRequest) -> Result<CurrentUser, AppError> {
    req.extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(AppError::Auth(AuthError::MissingToken))
}

#[derive(Deserialize)]
pub struct ChangeFullNameRequest {
    pub full_name: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
    pub new_password: String,
}

/// DELETE /users/delete
///
/// Soft-deletes the authenticated account and revokes every outstanding
/// session for it, not only the one making the request.
pub async fn delete_account(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let current = current_user(&req)?;
    let user_id = current.user_id()?;

    sessions.delete_account(user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User deleted successfully"
    })))
}

/// PUT /users/update/full_name
pub async fn change_full_name(
    req: HttpRequest,
    form: web::Json<ChangeFullNameRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let current = current_user(&req)?;
    let full_name = is_valid_full_name(&form.full_name)?;

    sessions
        .change_full_name(current.user_id()?, &full_name)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// PUT /users/update/password
///
/// On success the presented session token is revoked and a replacement is
/// returned.
pub async fn change_password(
    req: HttpRequest,
    form: web::Json<ChangePasswordRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let current = current_user(&req)?;
    let user_id = current.user_id()?;

    let session_token = sessions
        .change_password(user_id, &current.token, &form.password, &form.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Password updated successfully",
        "session_token": session_token
    })))
}
