//! Pluggable authentication backend
//!
//! The session manager talks to the account service only through
//! [`AuthBackend`], so the simulated backend shipped here can be replaced by
//! a real one without touching the manager's public contract.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::token::AuthTokens;
use crate::auth::user::{FarmDetails, ProcurementStats, User, UserRole};
use crate::config::SessionConfig;
use crate::error::{AgriSessionError, Result};
use crate::storage::{KeyValueStore, MockUserDb};

/// Trait for account/token backends
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Resolve the account for a phone number logging in with `role`
    async fn authenticate(
        &self,
        phone: &str,
        password: Option<&str>,
        role: UserRole,
    ) -> Result<User>;

    /// Register a new account, assigning an id when the caller left it empty
    async fn register(&self, user: User) -> Result<User>;

    /// Persist changes to an existing account
    async fn save_user(&self, user: &User) -> Result<()>;

    /// Issue a fresh token pair for an authenticated user
    async fn issue_tokens(&self, user: &User) -> Result<AuthTokens>;

    /// Exchange a refresh token for a new access token
    async fn refresh_tokens(&self, tokens: &AuthTokens) -> Result<AuthTokens>;

    /// Get the provider name for logging/debugging
    fn provider_name(&self) -> &'static str;
}

/// Simulated backend: accounts live in the mock users database and tokens
/// are unsigned placeholders.
pub struct MockAuthBackend {
    users: MockUserDb,
    token_ttl: Duration,
    default_location: String,
    default_profile_image: String,
}

impl MockAuthBackend {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &SessionConfig) -> Self {
        Self {
            users: MockUserDb::new(store),
            token_ttl: config.access_token_ttl,
            default_location: config.default_location.clone(),
            default_profile_image: config.default_profile_image.clone(),
        }
    }

    pub fn users(&self) -> &MockUserDb {
        &self.users
    }

    /// Builds a demo account for a phone number that never signed up
    pub fn synthesize_user(&self, phone: &str, role: UserRole) -> User {
        let mut user = User::new(generate_user_id(), demo_name(phone), phone.to_string(), role);

        let serial: u16 = rand::thread_rng().gen_range(1000..=9999);
        user.digital_id = Some(format!("AGC-{}-{}", role.digital_id_code(), serial));
        user.member_since = Some(Utc::now().year().to_string());
        user.rating = Some(4.8);
        user.harvests = Some(14);
        user.location = Some(self.default_location.clone());
        user.profile_image = Some(self.default_profile_image.clone());

        match role {
            UserRole::Farmer => {
                user.farm_details = Some(FarmDetails {
                    name: "Green Valley Farm".to_string(),
                    size: "5 Acres".to_string(),
                    location: "Bo District".to_string(),
                    crops: vec!["Rice".to_string(), "Cassava".to_string()],
                });
            }
            UserRole::Buyer => {
                user.procurement_stats = Some(ProcurementStats {
                    total_sourced: "0 Tons".to_string(),
                    payment_rating: 5.0,
                    active_bids: 0,
                });
                user.buying_interests = Some(vec!["Rice".to_string(), "Vegetables".to_string()]);
                user.is_verified_buyer = Some(true);
            }
            _ => {}
        }

        user
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn authenticate(
        &self,
        phone: &str,
        _password: Option<&str>,
        role: UserRole,
    ) -> Result<User> {
        match self.users.find_by_phone(phone).await? {
            None => {
                let user = self.synthesize_user(phone, role);
                log::debug!("Synthesized demo user {} for {}", user.id, role);
                self.users.save(&user).await?;
                Ok(user)
            }
            Some(mut user) if user.role != role => {
                // Last login wins
                log::debug!("Switching user {} from {} to {}", user.id, user.role, role);
                user.role = role;
                self.users.save(&user).await?;
                Ok(user)
            }
            Some(user) => Ok(user),
        }
    }

    async fn register(&self, mut user: User) -> Result<User> {
        if user.id.is_empty() {
            user.id = generate_user_id();
        }
        self.users.save(&user).await?;
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        self.users.save(user).await
    }

    async fn issue_tokens(&self, user: &User) -> Result<AuthTokens> {
        Ok(AuthTokens::issue(&user.id, self.token_ttl))
    }

    async fn refresh_tokens(&self, tokens: &AuthTokens) -> Result<AuthTokens> {
        if !tokens.has_refresh_token() {
            return Err(AgriSessionError::AuthError(
                "Refresh token missing".to_string(),
            ));
        }
        Ok(tokens.refreshed(self.token_ttl))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

fn generate_user_id() -> String {
    format!("user_{}", uuid::Uuid::new_v4().simple())
}

fn demo_name(phone: &str) -> String {
    let count = phone.chars().count();
    let tail: String = phone.chars().skip(count.saturating_sub(4)).collect();
    format!("User {}", tail)
}
