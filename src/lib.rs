//! AgriConnect session core
//!
//! Session/token lifecycle and the role-gated admin route guard used by the
//! AgriConnect marketplace admin portal.

pub mod admin;
pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod guard;
pub mod session;
pub mod storage;

// Re-export main components
pub use config::*;
pub use constants::*;
pub use error::{AgriSessionError, Result};
