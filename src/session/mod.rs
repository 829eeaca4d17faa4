//! Session lifecycle: the token manager and the context built on it

pub mod context;
pub mod manager;

pub use context::{SessionContext, SessionState};
pub use manager::SessionManager;
