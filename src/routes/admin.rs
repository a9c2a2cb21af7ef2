/// Admin surface: user listing (ADMIN) and role promotion (SUPER_ADMIN).
/// Role enforcement happens in the `RequireRole` middleware; handlers here
/// assume an authorized caller.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::admin::AdminManager;
use crate::error::{AppError, ValidationError};
use crate::roles::Role;
use crate::routes::users::UserResponse;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /admin/users?role=ADMIN&limit=20&offset=0
///
/// An unknown role filter matches nothing rather than everything, so a typo
/// cannot widen the result set.
pub async fn list_users(
    query: web::Query<ListUsersQuery>,
    admin: web::Data<AdminManager>,
) -> Result<HttpResponse, AppError> {
    let role = match &query.role {
        Some(raw) => match Role::parse(raw) {
            Some(role) => Some(role),
            None => {
                return Ok(HttpResponse::Ok().json(serde_json::json!({
                    "users": [],
                    "pagination": { "limit": 0, "offset": 0, "total": 0 }
                })))
            }
        },
        None => None,
    };
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let page = admin.list_users(role, limit, offset).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "users": page.users.iter().map(UserResponse::from).collect::<Vec<_>>(),
        "pagination": { "limit": limit, "offset": offset, "total": page.total }
    })))
}

/// GET /admin/grant-admin/{target_id}
///
/// # Errors
/// - 404 unknown target
/// - 409 target is already ADMIN or SUPER_ADMIN
pub async fn grant_admin(
    path: web::Path<String>,
    admin: web::Data<AdminManager>,
) -> Result<HttpResponse, AppError> {
    let target_id = Uuid::parse_str(&path.into_inner()).map_err(|_| {
        AppError::Validation(ValidationError::InvalidFormat("target_id".to_string()))
    })?;

    admin.grant_admin_role(target_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Admin role granted"
    })))
}
