use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum AgriSessionError {
    // Storage errors
    StorageError(String),
    SerializationError(String),

    // Auth errors
    AuthError(String),
    NoActiveSession,
    UserNotFound(String),

    // Validation errors
    ValidationError(String),

    // Transport errors
    TransportError(String),

    // Configuration errors
    ConfigError(String),
}

impl fmt::Display for AgriSessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Self::AuthError(msg) => write!(f, "Authentication error: {}", msg),
            Self::NoActiveSession => write!(f, "No active session"),
            Self::UserNotFound(key) => write!(f, "User not found: {}", key),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::TransportError(msg) => write!(f, "Transport error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for AgriSessionError {}

impl From<serde_json::Error> for AgriSessionError {
    fn from(err: serde_json::Error) -> Self {
        AgriSessionError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for AgriSessionError {
    fn from(err: std::io::Error) -> Self {
        AgriSessionError::StorageError(err.to_string())
    }
}

// Generic result type for the session core
pub type Result<T> = std::result::Result<T, AgriSessionError>;
