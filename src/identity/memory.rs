/// In-memory identity store used by the test suite.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, StoreError};
use crate::identity::{ApiTokenEntry, IdentityStore, NewUser, User};
use crate::roles::Role;

#[derive(Default)]
pub struct InMemoryIdentityStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    api_tokens: HashMap<Uuid, Vec<ApiTokenEntry>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .values()
            .any(|u| u.email == new_user.email && !u.deleted)
        {
            return Err(AppError::Store(StoreError::Duplicate(
                "Email already registered".to_string(),
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            full_name: new_user.full_name,
            password_hash: new_user.password_hash,
            role: new_user.role,
            deleted: false,
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .values()
            .find(|u| u.email == email && !u.deleted)
            .cloned())
    }

    async fn mark_deleted(&self, id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.get_mut(&id) {
            user.deleted = true;
        }
        Ok(())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.get_mut(&id) {
            user.role = role;
        }
        Ok(())
    }

    async fn set_full_name(&self, id: Uuid, full_name: &str) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.get_mut(&id) {
            user.full_name = full_name.to_string();
        }
        Ok(())
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.get_mut(&id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn push_api_token(&self, id: Uuid, entry: ApiTokenEntry) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.api_tokens.entry(id).or_default().push(entry);
        Ok(())
    }

    async fn pull_api_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entries) = inner.api_tokens.get_mut(&id) {
            entries.retain(|e| e.token != token);
        }
        Ok(())
    }

    async fn clear_api_tokens(&self, id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.api_tokens.remove(&id);
        Ok(())
    }

    async fn list_api_tokens(&self, id: Uuid) -> Result<Vec<ApiTokenEntry>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.api_tokens.get(&id).cloned().unwrap_or_default())
    }

    async fn find_any_with_role(&self, role: Role) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .values()
            .find(|u| u.role == role && !u.deleted)
            .cloned())
    }

    async fn list_users(
        &self,
        role: Option<Role>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|u| !u.deleted && role.map(|r| u.role == r).unwrap_or(true))
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_users(&self, role: Option<Role>) -> Result<i64, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .values()
            .filter(|u| !u.deleted && role.map(|r| u.role == r).unwrap_or(true))
            .count() as i64)
    }
}
