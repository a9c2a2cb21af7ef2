/// API-token collection lifecycle.
///
/// Long-lived machine credentials, stored by value on the owning identity
/// record and never tracked in the revocation ledger: deleting the stored
/// entry is the sole revocation mechanism. `delete_one` checks ownership
/// before touching the store so a syntactically valid token signed for a
/// different user can never remove anything.

use std::sync::Arc;
use uuid::Uuid;

use crate::auth::TokenService;
use crate::error::{AppError, AuthError};
use crate::identity::{ApiTokenEntry, IdentityStore};

pub struct ApiTokenManager {
    identities: Arc<dyn IdentityStore>,
    tokens: TokenService,
}

impl ApiTokenManager {
    pub fn new(identities: Arc<dyn IdentityStore>, tokens: TokenService) -> Self {
        Self { identities, tokens }
    }

    /// Mints a new API token and appends it to the user's collection under
    /// `name`. Names need not be unique; there is no count limit here.
    pub async fn create(&self, user_id: Uuid, name: &str) -> Result<ApiTokenEntry, AppError> {
        let token = self.tokens.issue_api_token(user_id)?;
        let entry = ApiTokenEntry {
            token,
            name: name.to_string(),
        };
        self.identities.push_api_token(user_id, entry.clone()).await?;

        tracing::info!(user_id = %user_id, name = %entry.name, "API token created");
        Ok(entry)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<ApiTokenEntry>, AppError> {
        self.identities.list_api_tokens(user_id).await
    }

    /// Deletes one token after an ownership check.
    ///
    /// # Errors
    /// `OwnershipMismatch` when the token fails signature validation or its
    /// `user_id` claim names someone else (both read "Invalid token" at the
    /// HTTP layer). Once ownership passes, removing an already-absent entry
    /// is a no-op, mirroring the ledger's idempotent-removal policy.
    pub async fn delete_one(&self, user_id: Uuid, token: &str) -> Result<String, AppError> {
        let owner = self
            .tokens
            .verify_api_token(token)
            .ok_or(AppError::Auth(AuthError::OwnershipMismatch))?;
        if owner != user_id {
            return Err(AppError::Auth(AuthError::OwnershipMismatch));
        }

        self.identities.pull_api_token(user_id, token).await?;

        tracing::info!(user_id = %user_id, "API token deleted");
        Ok(token.to_string())
    }

    /// Unconditionally clears the entire collection.
    pub async fn delete_all(&self, user_id: Uuid) -> Result<(), AppError> {
        self.identities.clear_api_tokens(user_id).await?;
        tracing::info!(user_id = %user_id, "All API tokens deleted");
        Ok(())
    }
}
