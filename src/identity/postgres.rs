/// Postgres-backed identity store.
///
/// API-token entries live in their own table keyed by `user_id`, so a
/// concurrent create and delete for the same user are independent row
/// operations and cannot lose each other's writes.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, StoreError};
use crate::identity::{ApiTokenEntry, IdentityStore, NewUser, User};
use crate::roles::Role;

#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

type UserRow = (
    Uuid,
    String,
    String,
    String,
    String,
    bool,
    DateTime<Utc>,
);

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User, AppError> {
        let (id, email, full_name, password_hash, role, deleted, created_at) = row;
        let role = Role::parse(&role).ok_or_else(|| {
            AppError::Store(StoreError::Query(format!(
                "unknown role '{}' on user {}",
                role, id
            )))
        })?;
        Ok(User {
            id,
            email,
            full_name,
            password_hash,
            role,
            deleted,
            created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, full_name, password_hash, role, deleted, created_at";

#[async_trait::async_trait]
impl IdentityStore for PgIdentityStore {
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO users (id, email, full_name, password_hash, role, deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, false, $6, $7)
            "#,
        )
        .bind(id)
        .bind(&new_user.email)
        .bind(&new_user.full_name)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            email: new_user.email,
            full_name: new_user.full_name,
            password_hash: new_user.password_hash,
            role: new_user.role,
            deleted: false,
            created_at: now,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1 AND deleted = false",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn mark_deleted(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET deleted = true, updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET role = $1, updated_at = $2 WHERE id = $3")
            .bind(role.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_full_name(&self, id: Uuid, full_name: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET full_name = $1, updated_at = $2 WHERE id = $3")
            .bind(full_name)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn push_api_token(&self, id: Uuid, entry: ApiTokenEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO api_tokens (id, user_id, token, name, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(&entry.token)
        .bind(&entry.name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn pull_api_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        // Zero rows affected is the idempotent no-op, not an error.
        sqlx::query("DELETE FROM api_tokens WHERE user_id = $1 AND token = $2")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_api_tokens(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM api_tokens WHERE user_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_api_tokens(&self, id: Uuid) -> Result<Vec<ApiTokenEntry>, AppError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT token, name FROM api_tokens WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(token, name)| ApiTokenEntry { token, name })
            .collect())
    }

    async fn find_any_with_role(&self, role: Role) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE role = $1 AND deleted = false LIMIT 1",
            USER_COLUMNS
        ))
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn list_users(
        &self,
        role: Option<Role>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, AppError> {
        let rows = match role {
            Some(role) => {
                sqlx::query_as::<_, UserRow>(&format!(
                    "SELECT {} FROM users WHERE role = $1 AND deleted = false \
                     ORDER BY created_at LIMIT $2 OFFSET $3",
                    USER_COLUMNS
                ))
                .bind(role.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, UserRow>(&format!(
                    "SELECT {} FROM users WHERE deleted = false \
                     ORDER BY created_at LIMIT $1 OFFSET $2",
                    USER_COLUMNS
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(Self::row_to_user).collect()
    }

    async fn count_users(&self, role: Option<Role>) -> Result<i64, AppError> {
        let count = match role {
            Some(role) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM users WHERE role = $1 AND deleted = false",
                )
                .bind(role.as_str())
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE deleted = false")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }
}
