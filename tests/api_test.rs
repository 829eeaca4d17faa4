use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};

use agri_session::api::{ApiRequest, ApiResponse, ApiTransport, AuthorizedClient};
use agri_session::auth::token::extract_bearer_token;
use agri_session::auth::UserRole;
use agri_session::config::SessionConfig;
use agri_session::constants::AUTH_TOKENS_KEY;
use agri_session::error::Result;
use agri_session::session::SessionManager;
use agri_session::storage::{KeyValueStore, MemoryStore};

/// Transport that answers from a script and records the bearer tokens it saw
struct ScriptedTransport {
    statuses: Mutex<Vec<u16>>,
    seen_tokens: Mutex<Vec<Option<String>>>,
}

impl ScriptedTransport {
    fn new(statuses: &[u16]) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().rev().copied().collect()),
            seen_tokens: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<Option<String>> {
        self.seen_tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.seen_tokens
            .lock()
            .unwrap()
            .push(request.authorization().and_then(extract_bearer_token));
        let status = self.statuses.lock().unwrap().pop().unwrap_or(200);
        Ok(ApiResponse {
            status,
            body: json!({ "status": status }),
        })
    }
}

fn logged_in_manager(store: &MemoryStore) -> Arc<SessionManager> {
    Arc::new(SessionManager::with_mock_backend(
        Arc::new(store.clone()),
        &SessionConfig::for_testing(),
    ))
}

#[tokio::test]
async fn test_attaches_stored_access_token() {
    let store = MemoryStore::new();
    let session = logged_in_manager(&store);
    assert!(session.login("+23277000000", None, UserRole::Buyer).await);
    let access = session.get_tokens().await.unwrap().access_token;

    let client = AuthorizedClient::new(ScriptedTransport::new(&[200]), session);
    let response = client.send(ApiRequest::get("/api/health")).await.unwrap();

    assert!(response.is_success());
    assert_eq!(client.transport().seen(), vec![Some(access)]);
}

#[tokio::test]
async fn test_unauthorized_refreshes_once_and_retries() {
    let store = MemoryStore::new();
    let session = logged_in_manager(&store);
    assert!(session.login("+23277000000", None, UserRole::Farmer).await);
    let original = session.get_tokens().await.unwrap().access_token;

    let client = AuthorizedClient::new(ScriptedTransport::new(&[401, 200]), session.clone());
    let response = client
        .send(ApiRequest::post("/api/marketplace/orders", json!({ "qty": 2 })))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    let seen = client.transport().seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].as_deref(), Some(original.as_str()));
    let refreshed = session.get_tokens().await.unwrap().access_token;
    assert_eq!(seen[1].as_deref(), Some(refreshed.as_str()));
    assert_ne!(refreshed, original);
}

#[tokio::test]
async fn test_second_unauthorized_is_not_retried_again() {
    let store = MemoryStore::new();
    let session = logged_in_manager(&store);
    assert!(session.login("+23277000000", None, UserRole::Farmer).await);

    let client = AuthorizedClient::new(ScriptedTransport::new(&[401, 401, 200]), session.clone());
    let response = client.send(ApiRequest::get("/api/marketplace/products")).await.unwrap();

    assert_eq!(response.status, 401);
    assert_eq!(client.transport().seen().len(), 2);
    assert!(session.is_authenticated().await);
}

#[tokio::test]
async fn test_failed_refresh_logs_out() {
    let store = MemoryStore::new();
    let session = logged_in_manager(&store);
    assert!(session.login("+23277000000", None, UserRole::Farmer).await);

    // Wipe the refresh token so the refresh cannot succeed
    let mut tokens = session.get_tokens().await.unwrap();
    tokens.refresh_token.clear();
    store
        .set_item(AUTH_TOKENS_KEY, serde_json::to_string(&tokens).unwrap())
        .await
        .unwrap();

    let client = AuthorizedClient::new(ScriptedTransport::new(&[401]), session.clone());
    let result = client.send(ApiRequest::get("/api/marketplace/products")).await;

    assert!(result.is_err());
    assert!(!session.is_authenticated().await);
    assert!(session.get_user().await.is_none());
}

#[tokio::test]
async fn test_anonymous_request_has_no_bearer() {
    let store = MemoryStore::new();
    let session = logged_in_manager(&store);

    let client = AuthorizedClient::new(ScriptedTransport::new(&[200]), session);
    client.send(ApiRequest::get("/api/health")).await.unwrap();
    assert_eq!(client.transport().seen(), vec![None]);
}
