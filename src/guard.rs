//! Admin route guard
//!
//! Decides, for the current session state and route segments, whether the
//! admin section should render, wait, or redirect. The decision itself is a
//! pure function; [`RouteGuard`] applies it to a [`Navigator`] and keeps
//! re-applying it as the session or the route changes.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::audit::{SessionAuditLog, SessionEvent};
use crate::auth::user::{is_admin_role, UserRole};
use crate::constants::{ADMIN_HOME_ROUTE, ADMIN_LOGIN_ROUTE, ADMIN_SEGMENT, LOGIN_SEGMENT};
use crate::session::SessionState;

/// Redirect targets inside the admin section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRoute {
    Login,
    Home,
}

impl AdminRoute {
    pub fn path(&self) -> &'static str {
        match self {
            AdminRoute::Login => ADMIN_LOGIN_ROUTE,
            AdminRoute::Home => ADMIN_HOME_ROUTE,
        }
    }
}

/// What the admin layout should do for the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Session still loading: show a spinner, make no decision
    Loading,
    /// Render the current route
    Render,
    /// Replace the current route
    Redirect(AdminRoute),
}

/// Evaluate the guard for a role (absent when logged out)
pub fn evaluate<S: AsRef<str>>(role: Option<UserRole>, loading: bool, segments: &[S]) -> GuardOutcome {
    if loading {
        return GuardOutcome::Loading;
    }

    let first: Option<&str> = segments.first().map(|s| s.as_ref());
    let second: Option<&str> = segments.get(1).map(|s| s.as_ref());
    let in_admin = first == Some(ADMIN_SEGMENT);
    let at_login = in_admin && second == Some(LOGIN_SEGMENT);
    let authorized = role.map(is_admin_role).unwrap_or(false);

    match (authorized, in_admin, at_login) {
        (false, true, false) => GuardOutcome::Redirect(AdminRoute::Login),
        (true, true, true) => GuardOutcome::Redirect(AdminRoute::Home),
        _ => GuardOutcome::Render,
    }
}

/// Evaluate the guard against a session snapshot
pub fn evaluate_state<S: AsRef<str>>(state: &SessionState, segments: &[S]) -> GuardOutcome {
    evaluate(state.role(), state.loading, segments)
}

/// Split a route path into its segments
pub fn segments_of(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Router collaborator receiving redirects
pub trait Navigator: Send + Sync {
    /// Replace the current route without pushing history
    fn replace(&self, route: &str);
}

#[derive(Default)]
pub struct RouteGuard {
    audit: Option<Arc<SessionAuditLog>>,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_audit(audit: Arc<SessionAuditLog>) -> Self {
        Self { audit: Some(audit) }
    }

    /// Evaluate once and perform any redirect
    pub async fn apply<S: AsRef<str>>(
        &self,
        state: &SessionState,
        segments: &[S],
        navigator: &dyn Navigator,
    ) -> GuardOutcome {
        let outcome = evaluate_state(state, segments);
        if let GuardOutcome::Redirect(route) = outcome {
            if let Some(audit) = &self.audit {
                audit
                    .record(SessionEvent::GuardRedirect {
                        role: state.role(),
                        to: route.path().to_string(),
                    })
                    .await;
            }
            navigator.replace(route.path());
        }
        outcome
    }

    /// Re-apply the guard whenever the session or the route segments change.
    /// The task ends once either sender is dropped.
    pub fn watch(
        self,
        mut session: watch::Receiver<SessionState>,
        mut segments: watch::Receiver<Vec<String>>,
        navigator: Arc<dyn Navigator>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let state = session.borrow_and_update().clone();
                let current = segments.borrow_and_update().clone();
                self.apply(&state, &current, navigator.as_ref()).await;

                tokio::select! {
                    changed = session.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = segments.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            log::debug!("Route guard stopped");
        })
    }
}
