//! Session lifecycle against the in-memory stores: login, verification,
//! per-token logout and whole-account revocation.

use std::sync::Arc;

use snapvault::auth::TokenService;
use snapvault::configuration::JwtSettings;
use snapvault::error::{AppError, AuthError, StoreError};
use snapvault::identity::{IdentityStore, InMemoryIdentityStore};
use snapvault::ledger::{InMemoryLedgerStore, RevocationLedger};
use snapvault::sessions::SessionManager;

struct TestCore {
    identities: Arc<InMemoryIdentityStore>,
    tokens: TokenService,
    sessions: SessionManager,
}

fn test_core() -> TestCore {
    let identities = Arc::new(InMemoryIdentityStore::new());
    let ledger = RevocationLedger::new(Arc::new(InMemoryLedgerStore::new()));
    let tokens = TokenService::new(
        JwtSettings::with_secret("test-secret-key-at-least-32-characters-long"),
        ledger,
    );
    let sessions = SessionManager::new(identities.clone(), tokens.clone());
    TestCore {
        identities,
        tokens,
        sessions,
    }
}

fn assert_auth_err<T: std::fmt::Debug>(result: Result<T, AppError>, expected: AuthError) {
    match result {
        Err(AppError::Auth(e)) => assert_eq!(e, expected),
        other => panic!("expected auth error {:?}, got {:?}", expected, other),
    }
}

#[tokio::test]
async fn login_issues_a_verifiable_session_token() {
    let core = test_core();
    core.sessions
        .register("alice@example.com", "Alice", "SecurePass123")
        .await
        .unwrap();

    let (user, token) = core
        .sessions
        .login("alice@example.com", "SecurePass123")
        .await
        .unwrap();

    let claims = core.tokens.verify_session_token(&token).await.unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);
    assert_eq!(claims.email, "alice@example.com");
    assert_eq!(claims.full_name, "Alice");
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_indistinguishable() {
    let core = test_core();
    core.sessions
        .register("alice@example.com", "Alice", "SecurePass123")
        .await
        .unwrap();

    assert_auth_err(
        core.sessions.login("alice@example.com", "WrongPass123").await,
        AuthError::InvalidCredentials,
    );
    assert_auth_err(
        core.sessions.login("nobody@example.com", "SecurePass123").await,
        AuthError::InvalidCredentials,
    );
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let core = test_core();
    core.sessions
        .register("alice@example.com", "Alice", "SecurePass123")
        .await
        .unwrap();

    let result = core
        .sessions
        .register("alice@example.com", "Imposter", "OtherPass123")
        .await;
    assert!(matches!(
        result,
        Err(AppError::Store(StoreError::Duplicate(_)))
    ));
}

#[tokio::test]
async fn logout_revokes_exactly_the_presented_token() {
    let core = test_core();
    core.sessions
        .register("alice@example.com", "Alice", "SecurePass123")
        .await
        .unwrap();

    let (user, first) = core
        .sessions
        .login("alice@example.com", "SecurePass123")
        .await
        .unwrap();
    let (_, second) = core
        .sessions
        .login("alice@example.com", "SecurePass123")
        .await
        .unwrap();

    core.sessions.logout(user.id, &first).await.unwrap();

    assert_auth_err(
        core.tokens.verify_session_token(&first).await,
        AuthError::TokenRevoked,
    );
    // The other session stays live: revocation is per token, not per user.
    assert!(core.tokens.verify_session_token(&second).await.is_ok());
}

#[tokio::test]
async fn logout_is_idempotent() {
    let core = test_core();
    let (user, token) = core
        .sessions
        .register("alice@example.com", "Alice", "SecurePass123")
        .await
        .unwrap();

    core.sessions.logout(user.id, &token).await.unwrap();
    core.sessions.logout(user.id, &token).await.unwrap();
}

#[tokio::test]
async fn delete_account_revokes_every_outstanding_session() {
    let core = test_core();
    core.sessions
        .register("alice@example.com", "Alice", "SecurePass123")
        .await
        .unwrap();

    let (user, first) = core
        .sessions
        .login("alice@example.com", "SecurePass123")
        .await
        .unwrap();
    let (_, second) = core
        .sessions
        .login("alice@example.com", "SecurePass123")
        .await
        .unwrap();

    core.sessions.delete_account(user.id).await.unwrap();

    assert_auth_err(
        core.tokens.verify_session_token(&first).await,
        AuthError::TokenRevoked,
    );
    assert_auth_err(
        core.tokens.verify_session_token(&second).await,
        AuthError::TokenRevoked,
    );
}

#[tokio::test]
async fn deleted_account_cannot_log_in_again() {
    let core = test_core();
    let (user, _) = core
        .sessions
        .register("alice@example.com", "Alice", "SecurePass123")
        .await
        .unwrap();

    core.sessions.delete_account(user.id).await.unwrap();

    assert_auth_err(
        core.sessions.login("alice@example.com", "SecurePass123").await,
        AuthError::InvalidCredentials,
    );

    // The record still exists, flagged deleted.
    let record = core.identities.find_by_id(user.id).await.unwrap().unwrap();
    assert!(record.deleted);
}

#[tokio::test]
async fn deleting_a_missing_or_deleted_account_is_not_found() {
    let core = test_core();
    let (user, _) = core
        .sessions
        .register("alice@example.com", "Alice", "SecurePass123")
        .await
        .unwrap();

    core.sessions.delete_account(user.id).await.unwrap();

    let again = core.sessions.delete_account(user.id).await;
    assert!(matches!(
        again,
        Err(AppError::Store(StoreError::NotFound(_)))
    ));
}

#[tokio::test]
async fn change_password_reissues_and_revokes_the_presented_session() {
    let core = test_core();
    let (user, old_token) = core
        .sessions
        .register("alice@example.com", "Alice", "SecurePass123")
        .await
        .unwrap();

    let new_token = core
        .sessions
        .change_password(user.id, &old_token, "SecurePass123", "FreshPass456")
        .await
        .unwrap();

    assert_auth_err(
        core.tokens.verify_session_token(&old_token).await,
        AuthError::TokenRevoked,
    );
    assert!(core.tokens.verify_session_token(&new_token).await.is_ok());

    // Old password no longer works.
    assert_auth_err(
        core.sessions.login("alice@example.com", "SecurePass123").await,
        AuthError::InvalidCredentials,
    );
    assert!(core
        .sessions
        .login("alice@example.com", "FreshPass456")
        .await
        .is_ok());
}

#[tokio::test]
async fn change_password_rejects_an_unchanged_password() {
    let core = test_core();
    let (user, token) = core
        .sessions
        .register("alice@example.com", "Alice", "SecurePass123")
        .await
        .unwrap();

    let result = core
        .sessions
        .change_password(user.id, &token, "SecurePass123", "SecurePass123")
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}
