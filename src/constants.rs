// Storage keys shared with the mobile client
pub const SESSION_USER_KEY: &str = "agri_user_session";
pub const AUTH_TOKENS_KEY: &str = "agri_auth_tokens";
pub const USERS_DB_KEY: &str = "agri_users_db";
pub const ADMIN_STORAGE_KEY: &str = "admin-storage";

// Token lifecycle
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 15 * 60;
pub const ACCESS_TOKEN_PREFIX: &str = "mock_access_token";
pub const REFRESH_TOKEN_PREFIX: &str = "mock_refresh_token";

// Admin route segments
pub const ADMIN_SEGMENT: &str = "admin";
pub const LOGIN_SEGMENT: &str = "login";
pub const ADMIN_HOME_ROUTE: &str = "/admin";
pub const ADMIN_LOGIN_ROUTE: &str = "/admin/login";

// Demo user defaults
pub const DEFAULT_LOCATION: &str = "Sierra Leone";
pub const DEFAULT_PROFILE_IMAGE: &str =
    "https://images.unsplash.com/photo-1595113333347-97507eb8b387?q=80&w=200&auto=format&fit=crop";

// Audit log
pub const DEFAULT_AUDIT_CAPACITY: usize = 1000;
