//! Authentication records and the pluggable auth backend

pub mod provider;
pub mod token;
pub mod user;

// Re-export main components
pub use provider::{AuthBackend, MockAuthBackend};
pub use token::AuthTokens;
pub use user::{is_admin_role, FarmDetails, ProcurementStats, SubscriptionTier, User, UserPatch, UserRole};
