/// Administrative operations: role promotion, user listing and the
/// super-admin bootstrap.

use std::sync::Arc;
use uuid::Uuid;

use crate::api_tokens::ApiTokenManager;
use crate::auth::hash_password;
use crate::configuration::SuperAdminSettings;
use crate::error::{AppError, AuthError, StoreError};
use crate::identity::{IdentityStore, NewUser, User};
use crate::roles::Role;

pub struct AdminManager {
    identities: Arc<dyn IdentityStore>,
}

/// A page of users plus the total matching count.
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
}

impl AdminManager {
    pub fn new(identities: Arc<dyn IdentityStore>) -> Self {
        Self { identities }
    }

    /// Promotes a user to ADMIN. One-directional: promoting someone who is
    /// already ADMIN or SUPER_ADMIN is an error, and the stored role is left
    /// untouched.
    pub async fn grant_admin_role(&self, target_id: Uuid) -> Result<(), AppError> {
        let user = self
            .identities
            .find_by_id(target_id)
            .await?
            .filter(|u| !u.deleted)
            .ok_or_else(|| AppError::Store(StoreError::NotFound("User not found".to_string())))?;

        if user.role.allows(Role::Admin) {
            return Err(AppError::Auth(AuthError::AlreadyGranted));
        }

        self.identities.set_role(user.id, Role::Admin).await?;

        tracing::info!(user_id = %user.id, "Admin role granted");
        Ok(())
    }

    pub async fn list_users(
        &self,
        role: Option<Role>,
        limit: i64,
        offset: i64,
    ) -> Result<UserPage, AppError> {
        let total = self.identities.count_users(role).await?;
        let users = self.identities.list_users(role, limit, offset).await?;
        Ok(UserPage { users, total })
    }

    /// Creates the configured SUPER_ADMIN account if none exists, together
    /// with a default API token. Idempotent across restarts.
    pub async fn ensure_super_admin(
        &self,
        settings: &SuperAdminSettings,
        api_tokens: &ApiTokenManager,
    ) -> Result<User, AppError> {
        if let Some(existing) = self.identities.find_any_with_role(Role::SuperAdmin).await? {
            tracing::info!(user_id = %existing.id, "Super admin already exists");
            return Ok(existing);
        }

        let password_hash = hash_password(&settings.password)?;
        let user = self
            .identities
            .insert(NewUser {
                email: settings.email.clone(),
                full_name: "Super Admin".to_string(),
                password_hash,
                role: Role::SuperAdmin,
            })
            .await?;

        api_tokens.create(user.id, "default").await?;

        tracing::info!(user_id = %user.id, "Super admin created");
        Ok(user)
    }
}
