//! Explicit session context handed to consumers
//!
//! Holds the loading flag and the current user, and publishes every change
//! on a watch channel so the route guard can re-evaluate.

use std::sync::Arc;
use tokio::sync::watch;

use super::manager::SessionManager;
use crate::auth::user::{SubscriptionTier, User, UserPatch, UserRole};
use crate::config::SessionConfig;
use crate::error::Result;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Snapshot observed by the route guard
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// True until persisted state has been loaded
    pub loading: bool,
    pub user: Option<User>,
}

impl SessionState {
    pub fn loading() -> Self {
        Self {
            loading: true,
            user: None,
        }
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|u| u.role)
    }
}

pub struct SessionContext {
    manager: SessionManager,
    state: watch::Sender<SessionState>,
}

impl SessionContext {
    /// Wrap a manager; the context starts in the loading state
    pub fn new(manager: SessionManager) -> Self {
        let (state, _) = watch::channel(SessionState::loading());
        Self { manager, state }
    }

    /// Build a context on the configured store and load persisted state
    pub async fn from_config(config: &SessionConfig) -> Result<Arc<Self>> {
        let store: Arc<dyn KeyValueStore> = match &config.store_path {
            Some(path) => Arc::new(FileStore::open(path).await?),
            None => Arc::new(MemoryStore::new()),
        };
        log::info!("Session store: {}", store.store_name());

        let context = Arc::new(Self::new(SessionManager::with_mock_backend(store, config)));
        context.initialize().await;
        Ok(context)
    }

    /// Load the persisted user and leave the loading state
    pub async fn initialize(&self) {
        self.reload().await;
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub async fn login(&self, phone: &str, password: Option<&str>, role: UserRole) -> bool {
        let ok = self.manager.login(phone, password, role).await;
        if ok {
            self.reload().await;
        }
        ok
    }

    pub async fn signup(&self, user: User) -> bool {
        let ok = self.manager.signup(user).await;
        if ok {
            self.reload().await;
        }
        ok
    }

    pub async fn update_profile(&self, patch: UserPatch) -> bool {
        let ok = self.manager.update_profile(patch).await;
        if ok {
            self.reload().await;
        }
        ok
    }

    pub async fn upgrade_subscription(&self, tier: SubscriptionTier) -> bool {
        let ok = self.manager.upgrade_subscription(tier).await;
        if ok {
            self.reload().await;
        }
        ok
    }

    /// Tear the session down. The published user follows what is left in
    /// storage, so a failed logout keeps the user signed in.
    pub async fn logout(&self) -> bool {
        let ok = self.manager.logout().await;
        self.reload().await;
        ok
    }

    async fn reload(&self) {
        let user = self.manager.get_user().await;
        self.state.send_modify(|state| {
            state.loading = false;
            state.user = user;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgriSessionError;
    use async_trait::async_trait;

    /// Memory store that refuses to delete anything
    struct StickyStore(MemoryStore);

    #[async_trait]
    impl KeyValueStore for StickyStore {
        async fn get_item(&self, key: &str) -> Result<Option<String>> {
            self.0.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: String) -> Result<()> {
            self.0.set_item(key, value).await
        }

        async fn remove_item(&self, key: &str) -> Result<()> {
            Err(AgriSessionError::StorageError(format!("cannot remove {}", key)))
        }

        fn store_name(&self) -> &'static str {
            "sticky"
        }
    }

    fn context() -> SessionContext {
        let store = Arc::new(MemoryStore::new());
        SessionContext::new(SessionManager::with_mock_backend(
            store,
            &SessionConfig::for_testing(),
        ))
    }

    #[tokio::test]
    async fn test_starts_loading_until_initialized() {
        let context = context();
        assert!(context.state().loading);

        context.initialize().await;
        let state = context.state();
        assert!(!state.loading);
        assert!(state.user.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_login_and_logout() {
        let context = context();
        context.initialize().await;
        let mut rx = context.subscribe();

        assert!(context.login("+23277000000", None, UserRole::Admin).await);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().role(), Some(UserRole::Admin));

        context.logout().await;
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().user.is_none());
        assert!(!context.manager().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_initialize_picks_up_persisted_session() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let config = SessionConfig::for_testing();

        let first = SessionContext::new(SessionManager::with_mock_backend(store.clone(), &config));
        assert!(first.login("+23277000000", None, UserRole::Farmer).await);

        let second = SessionContext::new(SessionManager::with_mock_backend(store, &config));
        second.initialize().await;
        assert_eq!(second.current_user(), first.current_user());
    }

    #[tokio::test]
    async fn test_failed_logout_keeps_user() {
        let store = Arc::new(StickyStore(MemoryStore::new()));
        let context = SessionContext::new(SessionManager::with_mock_backend(
            store,
            &SessionConfig::for_testing(),
        ));
        assert!(context.login("+23277000000", None, UserRole::Buyer).await);

        assert!(!context.logout().await);
        assert_eq!(context.state().role(), Some(UserRole::Buyer));
        assert!(context.manager().is_authenticated().await);
        assert_eq!(context.manager().audit().count("logout_failed").await, 1);
    }
}
