//! Session audit log: records what the session core did and emits it
//! through the `log` facade

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::user::UserRole;

/// Session lifecycle events worth keeping
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LoginSucceeded { user_id: String, role: UserRole },
    LoginFailed { phone: String, reason: String },
    SignupSucceeded { user_id: String, role: UserRole },
    SignupFailed { phone: String, reason: String },
    LoggedOut,
    LogoutFailed { reason: String },
    TokenRefreshed { expires_at: i64 },
    TokenRefreshFailed { reason: String },
    ProfileUpdated { user_id: String },
    ProfileUpdateFailed { reason: String },
    StorageFailure { operation: String, reason: String },
    GuardRedirect { role: Option<UserRole>, to: String },
}

impl SessionEvent {
    /// Counter key for this kind of event
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::LoginSucceeded { .. } => "login_succeeded",
            SessionEvent::LoginFailed { .. } => "login_failed",
            SessionEvent::SignupSucceeded { .. } => "signup_succeeded",
            SessionEvent::SignupFailed { .. } => "signup_failed",
            SessionEvent::LoggedOut => "logged_out",
            SessionEvent::LogoutFailed { .. } => "logout_failed",
            SessionEvent::TokenRefreshed { .. } => "token_refreshed",
            SessionEvent::TokenRefreshFailed { .. } => "token_refresh_failed",
            SessionEvent::ProfileUpdated { .. } => "profile_updated",
            SessionEvent::ProfileUpdateFailed { .. } => "profile_update_failed",
            SessionEvent::StorageFailure { .. } => "storage_failure",
            SessionEvent::GuardRedirect { .. } => "guard_redirect",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub event: SessionEvent,
    pub at: DateTime<Utc>,
}

/// Bounded in-memory record of session events
pub struct SessionAuditLog {
    events: RwLock<VecDeque<RecordedEvent>>,
    event_counts: RwLock<HashMap<&'static str, usize>>,
    max_events: usize,
    alert_thresholds: HashMap<&'static str, usize>,
}

impl SessionAuditLog {
    pub fn new(max_events: usize) -> Self {
        let mut alert_thresholds = HashMap::new();
        alert_thresholds.insert("login_failed", 5);
        alert_thresholds.insert("token_refresh_failed", 3);
        alert_thresholds.insert("storage_failure", 3);

        Self {
            events: RwLock::new(VecDeque::new()),
            event_counts: RwLock::new(HashMap::new()),
            max_events: max_events.max(1),
            alert_thresholds,
        }
    }

    pub fn shared(max_events: usize) -> Arc<Self> {
        Arc::new(Self::new(max_events))
    }

    /// Record an event and write it to the log
    pub async fn record(&self, event: SessionEvent) {
        let kind = event.kind();

        {
            let mut events = self.events.write().await;
            events.push_back(RecordedEvent {
                event: event.clone(),
                at: Utc::now(),
            });
            while events.len() > self.max_events {
                events.pop_front();
            }
        }

        {
            let mut counts = self.event_counts.write().await;
            let count = counts.entry(kind).or_insert(0);
            *count += 1;

            if let Some(&threshold) = self.alert_thresholds.get(kind) {
                if *count % threshold == 0 {
                    log::error!("SESSION ALERT: {} events of type '{}' recorded", count, kind);
                }
            }
        }

        match &event {
            SessionEvent::LoginSucceeded { user_id, role } => {
                log::info!("Login succeeded - User: {}, Role: {}", user_id, role);
            }
            SessionEvent::LoginFailed { phone, reason } => {
                log::error!("Login error - Phone: {}, Reason: {}", phone, reason);
            }
            SessionEvent::SignupSucceeded { user_id, role } => {
                log::info!("Signup succeeded - User: {}, Role: {}", user_id, role);
            }
            SessionEvent::SignupFailed { phone, reason } => {
                log::error!("Signup error - Phone: {}, Reason: {}", phone, reason);
            }
            SessionEvent::LoggedOut => log::info!("Session cleared"),
            SessionEvent::LogoutFailed { reason } => {
                log::error!("Logout error: {}", reason);
            }
            SessionEvent::TokenRefreshed { expires_at } => {
                log::debug!("Access token refreshed, expires at {}", expires_at);
            }
            SessionEvent::TokenRefreshFailed { reason } => {
                log::error!("Refresh token error: {}", reason);
            }
            SessionEvent::ProfileUpdated { user_id } => {
                log::info!("Profile updated - User: {}", user_id);
            }
            SessionEvent::ProfileUpdateFailed { reason } => {
                log::error!("Update profile error: {}", reason);
            }
            SessionEvent::StorageFailure { operation, reason } => {
                log::warn!("Storage failure during {}: {}", operation, reason);
            }
            SessionEvent::GuardRedirect { role, to } => {
                log::debug!("Route guard redirect - Role: {:?}, To: {}", role, to);
            }
        }
    }

    /// Most recent events, oldest first
    pub async fn recent(&self, limit: usize) -> Vec<SessionEvent> {
        let events = self.events.read().await;
        let skip = events.len().saturating_sub(limit);
        events.iter().skip(skip).map(|e| e.event.clone()).collect()
    }

    pub async fn count(&self, kind: &str) -> usize {
        self.event_counts.read().await.get(kind).copied().unwrap_or(0)
    }

    pub async fn stats(&self) -> HashMap<&'static str, usize> {
        self.event_counts.read().await.clone()
    }
}

impl Default for SessionAuditLog {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_AUDIT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buffer_is_bounded() {
        let log = SessionAuditLog::new(3);
        for expires_at in 0..5 {
            log.record(SessionEvent::TokenRefreshed { expires_at }).await;
        }

        let recent = log.recent(10).await;
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0], SessionEvent::TokenRefreshed { expires_at: 2 });
        assert_eq!(log.count("token_refreshed").await, 5);

        let last_two = log.recent(2).await;
        assert_eq!(
            last_two,
            vec![
                SessionEvent::TokenRefreshed { expires_at: 3 },
                SessionEvent::TokenRefreshed { expires_at: 4 },
            ]
        );
    }

    #[tokio::test]
    async fn test_counts_by_kind() {
        let log = SessionAuditLog::default();
        log.record(SessionEvent::LoggedOut).await;
        log.record(SessionEvent::LoggedOut).await;
        log.record(SessionEvent::LoginFailed {
            phone: "+23277000000".to_string(),
            reason: "disk".to_string(),
        })
        .await;

        let stats = log.stats().await;
        assert_eq!(stats.get("logged_out"), Some(&2));
        assert_eq!(stats.get("login_failed"), Some(&1));
        assert_eq!(log.count("signup_failed").await, 0);
    }
}
