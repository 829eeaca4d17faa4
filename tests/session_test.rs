use async_trait::async_trait;
use std::sync::Arc;

use agri_session::auth::{SubscriptionTier, User, UserPatch, UserRole};
use agri_session::config::SessionConfig;
use agri_session::constants::USERS_DB_KEY;
use agri_session::error::{AgriSessionError, Result};
use agri_session::session::SessionManager;
use agri_session::storage::{KeyValueStore, MemoryStore, MockUserDb};

const PHONE: &str = "+23277000000";

fn manager() -> (SessionManager, MemoryStore) {
    let store = MemoryStore::new();
    let manager =
        SessionManager::with_mock_backend(Arc::new(store.clone()), &SessionConfig::for_testing());
    (manager, store)
}

/// Store whose writes always fail
struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_item(&self, key: &str, _value: String) -> Result<()> {
        Err(AgriSessionError::StorageError(format!("{} is read-only", key)))
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        Err(AgriSessionError::StorageError(format!("{} is read-only", key)))
    }

    fn store_name(&self) -> &'static str {
        "read-only"
    }
}

#[tokio::test]
async fn test_login_then_role_switch_keeps_identity() {
    let (manager, _store) = manager();

    assert!(manager.login(PHONE, None, UserRole::Farmer).await);
    let farmer = manager.get_user().await.unwrap();
    assert_eq!(farmer.role, UserRole::Farmer);
    assert!(!farmer.digital_id.clone().unwrap_or_default().is_empty());

    assert!(manager.login(PHONE, Some("secret"), UserRole::Buyer).await);
    let buyer = manager.get_user().await.unwrap();
    assert_eq!(buyer.role, UserRole::Buyer);
    assert_eq!(buyer.id, farmer.id);
}

#[tokio::test]
async fn test_role_switch_is_written_to_users_db() {
    let store = MemoryStore::new();
    let shared: Arc<dyn KeyValueStore> = Arc::new(store.clone());
    let manager = SessionManager::with_mock_backend(shared.clone(), &SessionConfig::for_testing());

    assert!(manager.login(PHONE, None, UserRole::Logistics).await);
    assert!(manager.login(PHONE, None, UserRole::Admin).await);

    let stored = MockUserDb::new(shared).find_by_phone(PHONE).await.unwrap().unwrap();
    assert_eq!(stored.role, UserRole::Admin);
    assert!(store.contains_key(USERS_DB_KEY).await);
}

#[tokio::test]
async fn test_logout_clears_session_and_is_idempotent() {
    let (manager, _store) = manager();
    assert!(manager.login(PHONE, None, UserRole::Farmer).await);

    manager.logout().await;
    assert!(manager.get_user().await.is_none());
    assert!(manager.get_tokens().await.is_none());
    assert!(!manager.is_authenticated().await);

    manager.logout().await;
    assert!(!manager.is_authenticated().await);
}

#[tokio::test]
async fn test_logout_keeps_users_db() {
    let (manager, store) = manager();
    assert!(manager.login(PHONE, None, UserRole::Farmer).await);
    let id = manager.get_user().await.unwrap().id;

    manager.logout().await;
    assert!(store.contains_key(USERS_DB_KEY).await);

    assert!(manager.login(PHONE, None, UserRole::Farmer).await);
    assert_eq!(manager.get_user().await.unwrap().id, id);
}

#[tokio::test]
async fn test_refresh_without_tokens_returns_none_and_writes_nothing() {
    let (manager, store) = manager();
    assert!(manager.refresh_token().await.is_none());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_refresh_extends_expiry() {
    let (manager, _store) = manager();
    assert!(manager.login(PHONE, None, UserRole::Farmer).await);

    let access = manager.refresh_token().await.unwrap();
    let tokens = manager.get_tokens().await.unwrap();
    assert_eq!(tokens.access_token, access);
    assert!(access.starts_with("mock_access_token_refreshed_"));

    let now = chrono::Utc::now().timestamp_millis();
    let window = tokens.expires_at - now;
    assert!(window > 14 * 60 * 1000 && window <= 15 * 60 * 1000);
}

#[tokio::test]
async fn test_update_profile_replaces_only_given_fields() {
    let (manager, store) = manager();
    assert!(manager.login(PHONE, None, UserRole::Buyer).await);
    let before = manager.get_user().await.unwrap();

    assert!(manager.update_profile(UserPatch::name("X")).await);

    let after = manager.get_user().await.unwrap();
    let expected = User {
        name: "X".to_string(),
        ..before
    };
    assert_eq!(after, expected);

    let in_db = MockUserDb::new(Arc::new(store))
        .find_by_phone(PHONE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(in_db, expected);
}

#[tokio::test]
async fn test_profile_changes_need_a_session() {
    let (manager, store) = manager();
    assert!(!manager.update_profile(UserPatch::name("X")).await);
    assert!(!manager.upgrade_subscription(SubscriptionTier::ProFarmer).await);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_upgrade_subscription() {
    let (manager, _store) = manager();
    assert!(manager.login(PHONE, None, UserRole::Farmer).await);
    assert!(manager.upgrade_subscription(SubscriptionTier::ProFarmer).await);

    let user = manager.get_user().await.unwrap();
    assert_eq!(user.subscription_tier, Some(SubscriptionTier::ProFarmer));
    assert_eq!(user.role, UserRole::Farmer);
}

#[tokio::test]
async fn test_signup_logs_in() {
    let (manager, _store) = manager();
    let mut user = User::new(
        String::new(),
        "Fresh Foods Ltd".to_string(),
        "+23288555999".to_string(),
        UserRole::Buyer,
    );
    user.business_name = Some("Fresh Foods Ltd".to_string());

    assert!(manager.signup(user).await);
    let stored = manager.get_user().await.unwrap();
    assert!(!stored.id.is_empty());
    assert_eq!(stored.business_name.as_deref(), Some("Fresh Foods Ltd"));
    assert!(manager.is_authenticated().await);

    // The signed-up account is found on the next login
    manager.logout().await;
    assert!(manager.login("+23288555999", None, UserRole::Buyer).await);
    assert_eq!(manager.get_user().await.unwrap().id, stored.id);
}

#[tokio::test]
async fn test_storage_failures_become_false() {
    let manager =
        SessionManager::with_mock_backend(Arc::new(ReadOnlyStore), &SessionConfig::for_testing());

    assert!(!manager.login(PHONE, None, UserRole::Farmer).await);
    assert!(!manager.signup(User::new(
        String::new(),
        "A".to_string(),
        PHONE.to_string(),
        UserRole::Farmer
    ))
    .await);
    assert!(!manager.is_authenticated().await);

    // Logout swallows the failure
    manager.logout().await;

    let audit = manager.audit();
    assert_eq!(audit.count("login_failed").await, 1);
    assert_eq!(audit.count("signup_failed").await, 1);
    assert_eq!(audit.count("logout_failed").await, 1);
}

#[tokio::test]
async fn test_login_recovers_from_unreadable_users_db() {
    let (manager, store) = manager();
    store
        .set_item(USERS_DB_KEY, "{oops".to_string())
        .await
        .unwrap();

    assert!(manager.login(PHONE, None, UserRole::Farmer).await);
    let user = manager.get_user().await.unwrap();
    assert_eq!(user.role, UserRole::Farmer);

    // The rewritten database now holds the new account
    let in_db = MockUserDb::new(Arc::new(store.clone()))
        .find_by_phone(PHONE)
        .await
        .unwrap();
    assert_eq!(in_db, Some(user));
}

#[tokio::test]
async fn test_profile_update_survives_unreadable_users_db() {
    let (manager, store) = manager();
    assert!(manager.login(PHONE, None, UserRole::Buyer).await);
    store
        .set_item(USERS_DB_KEY, "{oops".to_string())
        .await
        .unwrap();

    assert!(manager.update_profile(UserPatch::name("X")).await);
    assert!(manager.upgrade_subscription(SubscriptionTier::ProBuyer).await);

    let user = manager.get_user().await.unwrap();
    assert_eq!(user.name, "X");
    assert_eq!(user.subscription_tier, Some(SubscriptionTier::ProBuyer));
}

#[tokio::test]
async fn test_login_with_empty_phone_succeeds() {
    let (manager, _store) = manager();
    assert!(manager.login("", None, UserRole::Farmer).await);
    assert_eq!(manager.get_user().await.unwrap().phone, "");
    assert!(manager.is_authenticated().await);
}
