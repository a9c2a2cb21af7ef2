/// Authentication routes: registration, login, logout and self lookup.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::routes::users::{current_user, UserResponse};
use crate::sessions::SessionManager;
use crate::validators::{is_valid_email, is_valid_full_name};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/register
///
/// Creates the account and logs it straight in.
///
/// # Errors
/// - 400: invalid email / name / weak password
/// - 409: email already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    let full_name = is_valid_full_name(&form.full_name)?;

    let (user, session_token) = sessions.register(&email, &full_name, &form.password).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Sign up successful",
        "session_token": session_token,
        "user": UserResponse::from(&user)
    })))
}

/// POST /auth/login
///
/// # Errors
/// - 400: malformed email
/// - 401: unknown email, deleted account or wrong password, all with the
///   same message (no user enumeration)
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    let (user, session_token) = sessions.login(&email, &form.password).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Login successful",
        "session_token": session_token,
        "user": UserResponse::from(&user)
    })))
}

/// POST /auth/logout
///
/// Revokes the presented session token only; the user's other sessions stay
/// live. Succeeds even when the token was already revoked.
pub async fn logout(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let current = current_user(&req)?;

    sessions.logout(current.user_id()?, &current.token).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Logout successful"
    })))
}

/// GET /auth/me
pub async fn get_current_user(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let current = current_user(&req)?;

    let user = sessions.current_user(current.user_id()?).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User info",
        "user": UserResponse::from(&user)
    })))
}
