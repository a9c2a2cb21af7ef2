/// Session lifecycle: login, logout, account maintenance, account deletion.
///
/// Per (user, token) pair the states are: anonymous → authenticated (login
/// registers the token in the ledger) → revoked (logout removes that one
/// token) or gone (account deletion removes the whole ledger entry). A
/// revoked token string never becomes valid again; a new login mints a new
/// token.

use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, TokenService};
use crate::error::{AppError, AuthError, StoreError};
use crate::identity::{IdentityStore, NewUser, User};
use crate::roles::Role;

pub struct SessionManager {
    identities: Arc<dyn IdentityStore>,
    tokens: TokenService,
}

impl SessionManager {
    pub fn new(identities: Arc<dyn IdentityStore>, tokens: TokenService) -> Self {
        Self { identities, tokens }
    }

    /// Creates a user record and logs it straight in.
    pub async fn register(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<(User, String), AppError> {
        let password_hash = hash_password(password)?;
        let user = self
            .identities
            .insert(NewUser {
                email: email.to_string(),
                full_name: full_name.to_string(),
                password_hash,
                role: Role::User,
            })
            .await?;

        let token = self.tokens.issue_session_token(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok((user, token))
    }

    /// Authenticates by email + password and issues a session token.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown email, a soft-deleted account or
    /// a wrong password; the three are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let user = self
            .identities
            .find_by_email(email)
            .await?
            .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Auth(AuthError::InvalidCredentials));
        }

        let token = self.tokens.issue_session_token(&user).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok((user, token))
    }

    /// Revokes exactly one session token. Other sessions of the same user
    /// stay live. Idempotent: revoking an already-absent token succeeds.
    pub async fn logout(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        self.tokens.ledger().remove_token(user_id, token).await?;
        tracing::info!(user_id = %user_id, "Session revoked");
        Ok(())
    }

    /// Soft-deletes the account and revokes every outstanding session, not
    /// only the presented one.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<(), AppError> {
        let user = self
            .identities
            .find_by_id(user_id)
            .await?
            .filter(|u| !u.deleted)
            .ok_or_else(|| AppError::Store(StoreError::NotFound("User not found".to_string())))?;

        self.identities.mark_deleted(user.id).await?;
        self.tokens.ledger().remove_all_for_user(user.id).await?;

        tracing::info!(user_id = %user.id, "Account deleted, all sessions revoked");
        Ok(())
    }

    /// Self lookup for an authenticated session.
    pub async fn current_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.identities
            .find_by_id(user_id)
            .await?
            .filter(|u| !u.deleted)
            .ok_or(AppError::Auth(AuthError::InvalidCredentials))
    }

    pub async fn change_full_name(&self, user_id: Uuid, full_name: &str) -> Result<(), AppError> {
        let user = self.current_user(user_id).await?;
        self.identities.set_full_name(user.id, full_name).await?;
        Ok(())
    }

    /// Changes the password, revokes the presented session and returns a
    /// fresh token for it.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_token: &str,
        password: &str,
        new_password: &str,
    ) -> Result<String, AppError> {
        if password == new_password {
            return Err(AppError::Validation(
                crate::error::ValidationError::InvalidFormat(
                    "new password must be different".to_string(),
                ),
            ));
        }

        let user = self.current_user(user_id).await?;
        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Auth(AuthError::InvalidCredentials));
        }

        let new_hash = hash_password(new_password)?;
        self.identities.set_password_hash(user.id, &new_hash).await?;

        let token = self.tokens.issue_session_token(&user).await?;
        self.tokens.ledger().remove_token(user.id, current_token).await?;

        tracing::info!(user_id = %user.id, "Password changed, session reissued");
        Ok(token)
    }
}
