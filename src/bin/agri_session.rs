use log::{error, info, warn};
use std::sync::Arc;

use agri_session::auth::UserRole;
use agri_session::config::SessionConfig;
use agri_session::guard::{segments_of, Navigator, RouteGuard};
use agri_session::session::SessionContext;

struct LogNavigator;

impl Navigator for LogNavigator {
    fn replace(&self, route: &str) {
        info!("Navigate -> {}", route);
    }
}

#[tokio::main]
async fn main() {
    // Initialize env
    match dotenvy::dotenv() {
        Ok(_) => info!("Environment variables loaded from .env file"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    };

    // Initialize logging
    env_logger::init();

    let config = match SessionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut args = std::env::args().skip(1);
    let phone = args.next().unwrap_or_else(|| "+23277000000".to_string());
    let role = match args.next().map(|r| r.parse::<UserRole>()) {
        Some(Ok(role)) => role,
        Some(Err(e)) => {
            error!("{}", e);
            std::process::exit(2);
        }
        None => UserRole::Admin,
    };

    let context = match SessionContext::from_config(&config).await {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to open session store: {}", e);
            std::process::exit(1);
        }
    };

    if !context.login(&phone, None, role).await {
        error!("Login failed for {}", phone);
        std::process::exit(1);
    }

    let navigator: Arc<dyn Navigator> = Arc::new(LogNavigator);
    let guard = RouteGuard::with_audit(context.manager().audit().clone());
    for path in ["/admin", "/admin/login"] {
        let outcome = guard
            .apply(&context.state(), &segments_of(path), navigator.as_ref())
            .await;
        info!("Guard on {}: {:?}", path, outcome);
    }
}
