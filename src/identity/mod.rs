/// Identity records and their durable store.
///
/// The identity record is the one durable object in the system: email +
/// password hash for login, a role for the authorization gate, a soft-delete
/// flag, and the embedded collection of named long-lived API tokens.
///
/// The store sits behind `IdentityStore` so the managers can be driven by
/// Postgres in production and by the in-memory implementation in tests.

mod memory;
mod postgres;

pub use memory::InMemoryIdentityStore;
pub use postgres::PgIdentityStore;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::roles::Role;

/// A durable user record.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: Role,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a user record.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: Role,
}

/// A named long-lived API token owned by a user.
///
/// The token string itself is the identity of the entry; names are labels
/// and need not be unique per user.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ApiTokenEntry {
    pub token: String,
    pub name: String,
}

/// Durable store for identity records.
///
/// `push_api_token` / `pull_api_token` must be atomic with respect to each
/// other so concurrent creates never clobber a sibling entry; the Postgres
/// implementation gets this from row-level inserts and deletes.
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    /// Creates a record; fails with a duplicate-entry error when the email
    /// is already registered.
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Looks up by id, soft-deleted records included (callers inspect the
    /// `deleted` flag themselves).
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Looks up by email for credential checks. Soft-deleted records are
    /// never matched.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn mark_deleted(&self, id: Uuid) -> Result<(), AppError>;
    async fn set_role(&self, id: Uuid, role: Role) -> Result<(), AppError>;
    async fn set_full_name(&self, id: Uuid, full_name: &str) -> Result<(), AppError>;
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AppError>;

    /// Appends an API-token entry.
    async fn push_api_token(&self, id: Uuid, entry: ApiTokenEntry) -> Result<(), AppError>;

    /// Removes the entry holding exactly `token`. A no-op when absent.
    async fn pull_api_token(&self, id: Uuid, token: &str) -> Result<(), AppError>;

    /// Removes every API-token entry for the user.
    async fn clear_api_tokens(&self, id: Uuid) -> Result<(), AppError>;

    async fn list_api_tokens(&self, id: Uuid) -> Result<Vec<ApiTokenEntry>, AppError>;

    /// Any live record holding `role`, used by the super-admin bootstrap.
    async fn find_any_with_role(&self, role: Role) -> Result<Option<User>, AppError>;

    async fn list_users(
        &self,
        role: Option<Role>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, AppError>;

    async fn count_users(&self, role: Option<Role>) -> Result<i64, AppError>;
}
