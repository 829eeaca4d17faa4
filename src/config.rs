//! Session configuration module
//! Handles tunable parameters for the session core

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_AUDIT_CAPACITY, DEFAULT_LOCATION, DEFAULT_PROFILE_IMAGE,
};
use crate::error::{AgriSessionError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Session configuration parameters
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Lifetime granted to a freshly issued or refreshed access token
    pub access_token_ttl: Duration,
    /// Backing file for the persistent store; in-memory when unset
    pub store_path: Option<PathBuf>,
    /// Location assigned to synthesized demo users
    pub default_location: String,
    /// Profile image assigned to synthesized demo users
    pub default_profile_image: String,
    /// Maximum number of audit events kept in memory
    pub audit_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_token_ttl: Duration::from_secs(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            store_path: None,
            default_location: DEFAULT_LOCATION.to_string(),
            default_profile_image: DEFAULT_PROFILE_IMAGE.to_string(),
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Create a test configuration with a small audit buffer
    pub fn for_testing() -> Self {
        Self {
            audit_capacity: 64,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables if available
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let ttl_secs = match lookup("AGRI_SESSION_TOKEN_TTL_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                AgriSessionError::ConfigError(format!(
                    "AGRI_SESSION_TOKEN_TTL_SECS must be a positive integer: {}",
                    e
                ))
            })?,
            None => DEFAULT_ACCESS_TOKEN_TTL_SECS,
        };

        if ttl_secs == 0 {
            return Err(AgriSessionError::ConfigError(
                "AGRI_SESSION_TOKEN_TTL_SECS must be greater than zero".to_string(),
            ));
        }

        let store_path = lookup("AGRI_SESSION_STORE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let default_location =
            lookup("AGRI_SESSION_DEFAULT_LOCATION").unwrap_or(defaults.default_location);

        let default_profile_image =
            lookup("AGRI_SESSION_PROFILE_IMAGE").unwrap_or(defaults.default_profile_image);

        let audit_capacity = lookup("AGRI_SESSION_AUDIT_CAPACITY")
            .and_then(|c| c.parse().ok())
            .unwrap_or(DEFAULT_AUDIT_CAPACITY);

        Ok(Self {
            access_token_ttl: Duration::from_secs(ttl_secs),
            store_path,
            default_location,
            default_profile_image,
            audit_capacity,
        })
    }
}
