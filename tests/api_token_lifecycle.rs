//! API-token collection lifecycle: creation, listing, ownership-checked
//! deletion and the lost-update guarantee for concurrent creates.

use std::sync::Arc;

use snapvault::api_tokens::ApiTokenManager;
use snapvault::auth::{hash_password, TokenService};
use snapvault::configuration::JwtSettings;
use snapvault::error::{AppError, AuthError};
use snapvault::identity::{IdentityStore, InMemoryIdentityStore, NewUser, User};
use snapvault::ledger::{InMemoryLedgerStore, RevocationLedger};
use snapvault::roles::Role;

struct TestCore {
    identities: Arc<InMemoryIdentityStore>,
    tokens: TokenService,
    api_tokens: ApiTokenManager,
}

fn test_core() -> TestCore {
    let identities = Arc::new(InMemoryIdentityStore::new());
    let ledger = RevocationLedger::new(Arc::new(InMemoryLedgerStore::new()));
    let tokens = TokenService::new(
        JwtSettings::with_secret("test-secret-key-at-least-32-characters-long"),
        ledger,
    );
    let api_tokens = ApiTokenManager::new(identities.clone(), tokens.clone());
    TestCore {
        identities,
        tokens,
        api_tokens,
    }
}

async fn create_user(core: &TestCore, email: &str) -> User {
    core.identities
        .insert(NewUser {
            email: email.to_string(),
            full_name: "Test User".to_string(),
            password_hash: hash_password("SecurePass123").unwrap(),
            role: Role::User,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn created_token_is_listed_and_verifiable() {
    let core = test_core();
    let user = create_user(&core, "alice@example.com").await;

    let entry = core.api_tokens.create(user.id, "ci-deploy").await.unwrap();

    assert_eq!(entry.name, "ci-deploy");
    assert_eq!(core.tokens.verify_api_token(&entry.token), Some(user.id));

    let listed = core.api_tokens.list(user.id).await.unwrap();
    assert_eq!(listed, vec![entry]);
}

#[tokio::test]
async fn delete_removes_the_entry_and_repeat_delete_is_a_noop() {
    let core = test_core();
    let user = create_user(&core, "alice@example.com").await;

    let entry = core.api_tokens.create(user.id, "n1").await.unwrap();
    core.api_tokens.delete_one(user.id, &entry.token).await.unwrap();

    let listed = core.api_tokens.list(user.id).await.unwrap();
    assert!(listed.iter().all(|e| e.name != "n1"));

    // The entry is gone, but the token still passes the ownership check,
    // so a second delete is a silent no-op.
    core.api_tokens.delete_one(user.id, &entry.token).await.unwrap();
}

#[tokio::test]
async fn deleting_the_entry_is_the_revocation_mechanism() {
    let core = test_core();
    let user = create_user(&core, "alice@example.com").await;

    let entry = core.api_tokens.create(user.id, "default").await.unwrap();
    core.api_tokens.delete_one(user.id, &entry.token).await.unwrap();

    // The signature still verifies; validity now hinges on the stored entry,
    // which the caller checks against the collection.
    assert_eq!(core.tokens.verify_api_token(&entry.token), Some(user.id));
    assert!(core.api_tokens.list(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn anothers_token_cannot_be_deleted() {
    let core = test_core();
    let alice = create_user(&core, "alice@example.com").await;
    let bob = create_user(&core, "bob@example.com").await;

    let entry = core.api_tokens.create(alice.id, "default").await.unwrap();

    let result = core.api_tokens.delete_one(bob.id, &entry.token).await;
    match result {
        Err(AppError::Auth(e)) => assert_eq!(e, AuthError::OwnershipMismatch),
        other => panic!("expected ownership mismatch, got {:?}", other),
    }

    // Alice's entry is untouched.
    assert_eq!(core.api_tokens.list(alice.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn garbage_token_fails_the_ownership_check() {
    let core = test_core();
    let user = create_user(&core, "alice@example.com").await;

    let result = core.api_tokens.delete_one(user.id, "not-a-jwt").await;
    assert!(matches!(
        result,
        Err(AppError::Auth(AuthError::OwnershipMismatch))
    ));
}

#[tokio::test]
async fn delete_all_clears_the_collection() {
    let core = test_core();
    let user = create_user(&core, "alice@example.com").await;

    core.api_tokens.create(user.id, "a").await.unwrap();
    core.api_tokens.create(user.id, "b").await.unwrap();
    core.api_tokens.delete_all(user.id).await.unwrap();

    assert!(core.api_tokens.list(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn names_need_not_be_unique() {
    let core = test_core();
    let user = create_user(&core, "alice@example.com").await;

    let first = core.api_tokens.create(user.id, "default").await.unwrap();
    let second = core.api_tokens.create(user.id, "default").await.unwrap();

    assert_ne!(first.token, second.token);
    assert_eq!(core.api_tokens.list(user.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn concurrent_creates_both_persist() {
    let core = test_core();
    let user = create_user(&core, "alice@example.com").await;

    let (a, b) = tokio::join!(
        core.api_tokens.create(user.id, "a"),
        core.api_tokens.create(user.id, "b"),
    );
    a.unwrap();
    b.unwrap();

    let listed = core.api_tokens.list(user.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    let mut names: Vec<&str> = listed.iter().map(|e| e.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["a", "b"]);
}
