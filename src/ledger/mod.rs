/// Revocation ledger
///
/// Records which session tokens are still honored for each user. A signed
/// session token is only as valid as its membership in the owning user's
/// ledger set: removing it there revokes it without waiting for expiry.
///
/// The ledger itself is a thin policy layer over a set-valued key-value
/// store; production uses Redis, tests substitute the in-memory store.

mod memory;
mod redis_store;

pub use memory::InMemoryLedgerStore;
pub use redis_store::RedisLedgerStore;

use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;

/// Set-valued key-value store backing the ledger.
///
/// Implementations must serialize concurrent writes to the same key
/// (atomic set-add / set-remove) and must surface backend failures as
/// errors rather than defaulting: a swallowed `add_member` failure would
/// leave a signed token with no revocation handle.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    async fn add_member(&self, key: &str, member: &str) -> Result<(), AppError>;
    async fn remove_member(&self, key: &str, member: &str) -> Result<(), AppError>;
    async fn contains_member(&self, key: &str, member: &str) -> Result<bool, AppError>;
    async fn delete_key(&self, key: &str) -> Result<(), AppError>;
    async fn flush_all(&self) -> Result<(), AppError>;
}

/// Session-revocation ledger keyed by user id.
#[derive(Clone)]
pub struct RevocationLedger {
    store: Arc<dyn LedgerStore>,
}

impl RevocationLedger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Registers `token` as a live session for `user_id`. Idempotent:
    /// re-adding the same token is harmless and does not break later removal.
    pub async fn add_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        self.store.add_member(&user_id.to_string(), token).await
    }

    /// True iff `token` is currently honored for `user_id`.
    pub async fn verify_token(&self, user_id: Uuid, token: &str) -> Result<bool, AppError> {
        self.store.contains_member(&user_id.to_string(), token).await
    }

    /// Revokes a single session. A no-op when the token is already absent.
    pub async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        self.store.remove_member(&user_id.to_string(), token).await
    }

    /// Revokes every session for `user_id` by deleting the whole entry.
    pub async fn remove_all_for_user(&self, user_id: Uuid) -> Result<(), AppError> {
        self.store.delete_key(&user_id.to_string()).await
    }

    /// Wipes the entire ledger. Test/teardown use only; never called from
    /// request paths.
    pub async fn delete_all_keys(&self) -> Result<(), AppError> {
        self.store.flush_all().await
    }
}
