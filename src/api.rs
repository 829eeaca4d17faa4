//! Bearer-token request policy for the marketplace REST client
//!
//! The HTTP transport itself lives outside this crate. [`AuthorizedClient`]
//! attaches the stored access token, and on a 401 refreshes once and
//! retries; when the refresh fails the session is logged out.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgriSessionError, Result};
use crate::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            headers: HashMap::new(),
            body: Some(body),
        }
    }

    pub fn set_bearer(&mut self, access_token: &str) {
        self.headers
            .insert("authorization".to_string(), format!("Bearer {}", access_token));
    }

    pub fn authorization(&self) -> Option<&str> {
        self.headers.get("authorization").map(|h| h.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Sends requests over whatever HTTP stack the app uses
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

pub struct AuthorizedClient<T: ApiTransport> {
    transport: T,
    session: Arc<SessionManager>,
}

impl<T: ApiTransport> AuthorizedClient<T> {
    pub fn new(transport: T, session: Arc<SessionManager>) -> Self {
        Self { transport, session }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send with the stored access token, refreshing at most once on 401
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        if let Some(tokens) = self.session.get_tokens().await {
            request.set_bearer(&tokens.access_token);
        }

        let response = self.transport.send(&request).await?;
        if !response.is_unauthorized() {
            log_failure(&request, &response);
            return Ok(response);
        }

        match self.session.refresh_token().await {
            Some(access_token) => {
                request.set_bearer(&access_token);
                let retried = self.transport.send(&request).await?;
                log_failure(&request, &retried);
                Ok(retried)
            }
            None => {
                log::warn!("Token refresh failed for {}, signing out", request.path);
                self.session.logout().await;
                Err(AgriSessionError::AuthError(
                    "Session expired and could not be refreshed".to_string(),
                ))
            }
        }
    }
}

fn log_failure(request: &ApiRequest, response: &ApiResponse) {
    if !response.is_success() {
        log::error!(
            "API Error: {} {} -> {} {}",
            match request.method {
                Method::Get => "GET",
                Method::Post => "POST",
            },
            request.path,
            response.status,
            response.body
        );
    }
}
