/// JWT claim schemas (RFC 7519).
///
/// `SessionClaims` is the fixed safe subset forwarded to callers after
/// verification; deserializing through it strips any extra fields a token
/// might carry. `ApiTokenClaims` carries only the owning user id plus a
/// random `jti` so two tokens minted within the same second still differ.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::identity::User;
use crate::roles::Role;

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl SessionClaims {
    pub fn new(user: &User, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            exp: now + expiry_seconds,
            iat: now,
        }
    }

    /// # Errors
    /// Returns error if the subject is not a valid UUID
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Internal("Invalid user ID in token".to_string()))
    }
}

/// Claims carried by a long-lived API token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiTokenClaims {
    pub user_id: String,
    /// Random token id; the entropy that makes each minted token unique.
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl ApiTokenClaims {
    pub fn new(user_id: Uuid, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        let jti: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        Self {
            user_id: user_id.to_string(),
            jti,
            exp: now + expiry_seconds,
            iat: now,
        }
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.user_id)
            .map_err(|_| AppError::Internal("Invalid user ID in token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            full_name: "Test User".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            role: Role::User,
            deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn session_claims_carry_the_identity_subset() {
        let user = sample_user();
        let claims = SessionClaims::new(&user, 3600);

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.full_name, user.full_name);
        assert_eq!(claims.role, Role::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn user_id_extraction() {
        let user = sample_user();
        let claims = SessionClaims::new(&user, 3600);
        assert_eq!(claims.user_id().unwrap(), user.id);
    }

    #[test]
    fn invalid_subject_is_rejected() {
        let user = sample_user();
        let mut claims = SessionClaims::new(&user, 3600);
        claims.sub = "not-a-uuid".to_string();
        assert!(claims.user_id().is_err());
    }

    #[test]
    fn api_token_claims_get_distinct_jtis() {
        let user_id = Uuid::new_v4();
        let a = ApiTokenClaims::new(user_id, 60);
        let b = ApiTokenClaims::new(user_id, 60);

        assert_eq!(a.jti.len(), 16);
        assert_ne!(a.jti, b.jti);
        assert_eq!(a.user_id().unwrap(), user_id);
    }

    #[test]
    fn deserializing_drops_unexpected_fields() {
        let user = sample_user();
        let mut value = serde_json::to_value(SessionClaims::new(&user, 60)).unwrap();
        value["is_admin"] = serde_json::json!(true);

        let reparsed: SessionClaims = serde_json::from_value(value).unwrap();
        let reserialized = serde_json::to_value(&reparsed).unwrap();
        assert!(reserialized.get("is_admin").is_none());
    }
}
