//! Session/token manager
//!
//! Owns the persisted session user and token pair. Every public operation
//! swallows its own failures: errors are logged, recorded in the audit log
//! and turned into `false` or `None` for the caller.

use std::sync::Arc;

use crate::audit::{SessionAuditLog, SessionEvent};
use crate::auth::provider::{AuthBackend, MockAuthBackend};
use crate::auth::token::AuthTokens;
use crate::auth::user::{SubscriptionTier, User, UserPatch, UserRole};
use crate::config::SessionConfig;
use crate::constants::{AUTH_TOKENS_KEY, SESSION_USER_KEY};
use crate::error::{AgriSessionError, Result};
use crate::storage::{read_json, write_json, KeyValueStore};

pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    backend: Arc<dyn AuthBackend>,
    audit: Arc<SessionAuditLog>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        backend: Arc<dyn AuthBackend>,
        audit: Arc<SessionAuditLog>,
    ) -> Self {
        log::debug!(
            "Session manager using {} backend on {} store",
            backend.provider_name(),
            store.store_name()
        );
        Self {
            store,
            backend,
            audit,
        }
    }

    /// Manager backed by the simulated auth backend on the same store
    pub fn with_mock_backend(store: Arc<dyn KeyValueStore>, config: &SessionConfig) -> Self {
        let backend = Arc::new(MockAuthBackend::new(store.clone(), config));
        let audit = SessionAuditLog::shared(config.audit_capacity);
        Self::new(store, backend, audit)
    }

    pub fn audit(&self) -> &Arc<SessionAuditLog> {
        &self.audit
    }

    /// Log in by phone. Unknown phones get a demo account; known phones
    /// take the requested role.
    pub async fn login(&self, phone: &str, password: Option<&str>, role: UserRole) -> bool {
        match self.try_login(phone, password, role).await {
            Ok(user) => {
                self.audit
                    .record(SessionEvent::LoginSucceeded {
                        user_id: user.id,
                        role: user.role,
                    })
                    .await;
                true
            }
            Err(e) => {
                self.audit
                    .record(SessionEvent::LoginFailed {
                        phone: phone.to_string(),
                        reason: e.to_string(),
                    })
                    .await;
                false
            }
        }
    }

    async fn try_login(&self, phone: &str, password: Option<&str>, role: UserRole) -> Result<User> {
        let user = self.backend.authenticate(phone, password, role).await?;
        let tokens = self.backend.issue_tokens(&user).await?;
        self.persist_session(&user, &tokens).await?;
        Ok(user)
    }

    /// Register an account and log it in
    pub async fn signup(&self, user: User) -> bool {
        let phone = user.phone.clone();
        match self.try_signup(user).await {
            Ok(user) => {
                self.audit
                    .record(SessionEvent::SignupSucceeded {
                        user_id: user.id,
                        role: user.role,
                    })
                    .await;
                true
            }
            Err(e) => {
                self.audit
                    .record(SessionEvent::SignupFailed {
                        phone,
                        reason: e.to_string(),
                    })
                    .await;
                false
            }
        }
    }

    async fn try_signup(&self, user: User) -> Result<User> {
        let user = self.backend.register(user).await?;
        let tokens = self.backend.issue_tokens(&user).await?;
        self.persist_session(&user, &tokens).await?;
        Ok(user)
    }

    // Tokens first, then user. No transaction spans the two writes.
    async fn persist_session(&self, user: &User, tokens: &AuthTokens) -> Result<()> {
        write_json(self.store.as_ref(), AUTH_TOKENS_KEY, tokens).await?;
        write_json(self.store.as_ref(), SESSION_USER_KEY, user).await
    }

    /// Drop the session user and tokens. Safe to call without a session.
    pub async fn logout(&self) -> bool {
        match self.clear_session().await {
            Ok(()) => {
                self.audit.record(SessionEvent::LoggedOut).await;
                true
            }
            Err(e) => {
                self.audit
                    .record(SessionEvent::LogoutFailed {
                        reason: e.to_string(),
                    })
                    .await;
                false
            }
        }
    }

    async fn clear_session(&self) -> Result<()> {
        self.store.remove_item(SESSION_USER_KEY).await?;
        self.store.remove_item(AUTH_TOKENS_KEY).await
    }

    /// The logged-in user, if any. Unreadable records count as absent.
    pub async fn get_user(&self) -> Option<User> {
        self.read_or_none(SESSION_USER_KEY, "get_user").await
    }

    /// The persisted token pair, if any
    pub async fn get_tokens(&self) -> Option<AuthTokens> {
        self.read_or_none(AUTH_TOKENS_KEY, "get_tokens").await
    }

    async fn read_or_none<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
        operation: &str,
    ) -> Option<T> {
        match read_json(self.store.as_ref(), key).await {
            Ok(value) => value,
            Err(e) => {
                self.audit
                    .record(SessionEvent::StorageFailure {
                        operation: operation.to_string(),
                        reason: e.to_string(),
                    })
                    .await;
                None
            }
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Returns `None` without writing anything when no refresh token is
    /// stored. Expiry is moved to now + the configured token lifetime.
    pub async fn refresh_token(&self) -> Option<String> {
        let tokens = self.get_tokens().await?;
        if !tokens.has_refresh_token() {
            return None;
        }

        match self.try_refresh(&tokens).await {
            Ok(refreshed) => {
                self.audit
                    .record(SessionEvent::TokenRefreshed {
                        expires_at: refreshed.expires_at,
                    })
                    .await;
                Some(refreshed.access_token)
            }
            Err(e) => {
                self.audit
                    .record(SessionEvent::TokenRefreshFailed {
                        reason: e.to_string(),
                    })
                    .await;
                None
            }
        }
    }

    async fn try_refresh(&self, tokens: &AuthTokens) -> Result<AuthTokens> {
        let refreshed = self.backend.refresh_tokens(tokens).await?;
        write_json(self.store.as_ref(), AUTH_TOKENS_KEY, &refreshed).await?;
        Ok(refreshed)
    }

    /// Merge a partial update into the logged-in user
    pub async fn update_profile(&self, patch: UserPatch) -> bool {
        let Some(user) = self.get_user().await else {
            log::debug!("update_profile called without a session");
            return false;
        };

        let updated = user.merged(patch);
        match self.save_profile(&updated).await {
            Ok(()) => {
                self.audit
                    .record(SessionEvent::ProfileUpdated {
                        user_id: updated.id,
                    })
                    .await;
                true
            }
            Err(e) => {
                self.audit
                    .record(SessionEvent::ProfileUpdateFailed {
                        reason: e.to_string(),
                    })
                    .await;
                false
            }
        }
    }

    pub async fn upgrade_subscription(&self, tier: SubscriptionTier) -> bool {
        self.update_profile(UserPatch::subscription_tier(tier)).await
    }

    async fn save_profile(&self, user: &User) -> Result<()> {
        self.backend.save_user(user).await?;
        write_json(self.store.as_ref(), SESSION_USER_KEY, user).await
    }

    /// True iff a token pair is stored. Expiry is not checked.
    pub async fn is_authenticated(&self) -> bool {
        self.get_tokens().await.is_some()
    }

    /// The logged-in user, or `NoActiveSession`
    pub async fn require_user(&self) -> Result<User> {
        self.get_user()
            .await
            .ok_or(AgriSessionError::NoActiveSession)
    }
}
