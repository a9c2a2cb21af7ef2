//! Role promotion and the super-admin bootstrap.

use std::sync::Arc;

use snapvault::admin::AdminManager;
use snapvault::api_tokens::ApiTokenManager;
use snapvault::auth::{hash_password, TokenService};
use snapvault::configuration::{JwtSettings, SuperAdminSettings};
use snapvault::error::{AppError, AuthError, StoreError};
use snapvault::identity::{IdentityStore, InMemoryIdentityStore, NewUser, User};
use snapvault::ledger::{InMemoryLedgerStore, RevocationLedger};
use snapvault::roles::Role;

struct TestCore {
    identities: Arc<InMemoryIdentityStore>,
    admin: AdminManager,
    api_tokens: ApiTokenManager,
}

fn test_core() -> TestCore {
    let identities = Arc::new(InMemoryIdentityStore::new());
    let ledger = RevocationLedger::new(Arc::new(InMemoryLedgerStore::new()));
    let tokens = TokenService::new(
        JwtSettings::with_secret("test-secret-key-at-least-32-characters-long"),
        ledger,
    );
    let admin = AdminManager::new(identities.clone());
    let api_tokens = ApiTokenManager::new(identities.clone(), tokens);
    TestCore {
        identities,
        admin,
        api_tokens,
    }
}

async fn create_user(core: &TestCore, email: &str, role: Role) -> User {
    core.identities
        .insert(NewUser {
            email: email.to_string(),
            full_name: "Test User".to_string(),
            password_hash: hash_password("SecurePass123").unwrap(),
            role,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn promoting_a_user_grants_admin() {
    let core = test_core();
    let user = create_user(&core, "alice@example.com", Role::User).await;

    core.admin.grant_admin_role(user.id).await.unwrap();

    let updated = core.identities.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(updated.role, Role::Admin);
}

#[tokio::test]
async fn promoting_an_admin_fails_and_leaves_the_role_unchanged() {
    let core = test_core();
    let user = create_user(&core, "admin@example.com", Role::Admin).await;

    let result = core.admin.grant_admin_role(user.id).await;
    assert!(matches!(
        result,
        Err(AppError::Auth(AuthError::AlreadyGranted))
    ));

    let unchanged = core.identities.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(unchanged.role, Role::Admin);
}

#[tokio::test]
async fn promoting_a_super_admin_fails_without_demoting() {
    let core = test_core();
    let user = create_user(&core, "root@example.com", Role::SuperAdmin).await;

    let result = core.admin.grant_admin_role(user.id).await;
    assert!(matches!(
        result,
        Err(AppError::Auth(AuthError::AlreadyGranted))
    ));

    let unchanged = core.identities.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(unchanged.role, Role::SuperAdmin);
}

#[tokio::test]
async fn promoting_an_unknown_user_is_not_found() {
    let core = test_core();
    let result = core.admin.grant_admin_role(uuid::Uuid::new_v4()).await;
    assert!(matches!(
        result,
        Err(AppError::Store(StoreError::NotFound(_)))
    ));
}

#[tokio::test]
async fn bootstrap_creates_the_super_admin_once() {
    let core = test_core();
    let settings = SuperAdminSettings {
        email: "root@example.com".to_string(),
        password: "BootstrapPass1".to_string(),
    };

    let created = core
        .admin
        .ensure_super_admin(&settings, &core.api_tokens)
        .await
        .unwrap();
    assert_eq!(created.role, Role::SuperAdmin);

    // Bootstrap hands the account a default API token.
    let entries = core.api_tokens.list(created.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "default");

    // Second run is a no-op reporting the existing account.
    let again = core
        .admin
        .ensure_super_admin(&settings, &core.api_tokens)
        .await
        .unwrap();
    assert_eq!(again.id, created.id);
    assert_eq!(core.api_tokens.list(created.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_users_filters_by_role_and_pages() {
    let core = test_core();
    create_user(&core, "a@example.com", Role::User).await;
    create_user(&core, "b@example.com", Role::User).await;
    create_user(&core, "c@example.com", Role::Admin).await;

    let admins = core.admin.list_users(Some(Role::Admin), 10, 0).await.unwrap();
    assert_eq!(admins.total, 1);
    assert_eq!(admins.users.len(), 1);

    let all = core.admin.list_users(None, 2, 0).await.unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.users.len(), 2);

    let rest = core.admin.list_users(None, 2, 2).await.unwrap();
    assert_eq!(rest.users.len(), 1);
}
