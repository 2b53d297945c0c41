// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Navigation: resolve a requested path to the screen that renders.
//!
//! Every hop is evaluated against one session snapshot, so a navigation
//! cannot observe half of a sign-in. A chain that revisits a path or exceeds
//! [`MAX_REDIRECTS`] is reported as [`NavigationError::RedirectLoop`] instead
//! of spinning.

use std::sync::Arc;

use tracing::debug;

use super::guards::{AuthGuardState, AuthenticationGuard, GuardDecision, RoleGuard};
use super::routes::{Access, RouteMatch, RouteTable, Screen};
use super::{
    BACKOFFICE_HOME_PATH, LANDING_PATH, LOGIN_PATH, OPERATOR_HOME_PATH, UNAUTHORIZED_PATH,
};
use crate::auth::{ResolvedRole, Role};
use crate::session::{SessionSnapshot, SessionStore};

/// Longest redirect chain a single navigation may follow.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// No route matched the path
    Unmatched,
    /// Authenticated route, no credential
    Unauthenticated,
    /// Role route, role not in the allowed set
    RoleDenied,
    /// Login screen while holding a usable credential
    AlreadySignedIn,
    /// Credential whose role may not use this channel
    NotEntitled,
    /// Landing route dispatching to a role home
    Landing,
}

/// One hop of a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub from: String,
    pub to: String,
    pub reason: RedirectReason,
}

/// Where a navigation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The screen renders
    Render(RouteMatch),
    /// Nothing renders until the session settles
    Pending(RouteMatch),
}

/// Result of resolving one requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub redirects: Vec<Redirect>,
    pub resolution: Resolution,
}

impl Navigation {
    fn route(&self) -> &RouteMatch {
        match &self.resolution {
            Resolution::Render(m) | Resolution::Pending(m) => m,
        }
    }

    /// Path the visitor ends up on.
    pub fn final_path(&self) -> &str {
        &self.route().path
    }

    pub fn screen(&self) -> Screen {
        self.route().screen
    }

    /// The screen that renders, if any.
    pub fn rendered(&self) -> Option<Screen> {
        match &self.resolution {
            Resolution::Render(m) => Some(m.screen),
            Resolution::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.resolution, Resolution::Pending(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("Redirect loop: {}", chain.join(" -> "))]
    RedirectLoop { chain: Vec<String> },
}

/// What one route evaluation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Render,
    Pending,
    Redirect(&'static str, RedirectReason),
}

/// Resolves paths against the live session.
#[derive(Debug, Clone)]
pub struct Navigator {
    routes: Arc<RouteTable>,
    session: SessionStore,
}

impl Navigator {
    pub fn new(routes: Arc<RouteTable>, session: SessionStore) -> Self {
        Self { routes, session }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Resolve `path` against the current session.
    pub fn resolve(&self, path: &str) -> Result<Navigation, NavigationError> {
        resolve_path(&self.routes, &self.session.snapshot(), path)
    }
}

/// Resolve `path` against an explicit session snapshot.
pub fn resolve_path(
    routes: &RouteTable,
    session: &SessionSnapshot,
    path: &str,
) -> Result<Navigation, NavigationError> {
    let role = ResolvedRole::from_snapshot(session);
    let requested = super::routes::normalize_path(path);

    let mut current = requested.clone();
    let mut chain = vec![current.clone()];
    let mut redirects = Vec::new();

    loop {
        let (to, reason) = match routes.match_path(&current) {
            Some(matched) => match evaluate(&matched, session, &role) {
                Step::Render => {
                    debug!(
                        requested = %requested,
                        path = %matched.path,
                        hops = redirects.len(),
                        "Navigation resolved"
                    );
                    return Ok(Navigation {
                        requested,
                        redirects,
                        resolution: Resolution::Render(matched),
                    });
                }
                Step::Pending => {
                    debug!(
                        requested = %requested,
                        path = %matched.path,
                        "Navigation pending on session"
                    );
                    return Ok(Navigation {
                        requested,
                        redirects,
                        resolution: Resolution::Pending(matched),
                    });
                }
                Step::Redirect(to, reason) => (to, reason),
            },
            None => (LOGIN_PATH, RedirectReason::Unmatched),
        };

        debug!(from = %current, to, ?reason, "Redirect");
        let revisit = chain.iter().any(|p| p == to);
        chain.push(to.to_string());
        if revisit || chain.len() > MAX_REDIRECTS + 1 {
            return Err(NavigationError::RedirectLoop { chain });
        }

        redirects.push(Redirect {
            from: std::mem::replace(&mut current, to.to_string()),
            to: to.to_string(),
            reason,
        });
    }
}

fn evaluate(matched: &RouteMatch, session: &SessionSnapshot, role: &ResolvedRole) -> Step {
    if matched.access.requires_credential() {
        match AuthenticationGuard::default().decide(session) {
            GuardDecision::Render => {}
            GuardDecision::Pending => return Step::Pending,
            GuardDecision::Redirect(to) => {
                return Step::Redirect(to, RedirectReason::Unauthenticated)
            }
        }
    }
    if let Access::Roles(allowed) = &matched.access {
        match RoleGuard::new(allowed).decide(role) {
            GuardDecision::Render => {}
            GuardDecision::Pending => return Step::Pending,
            GuardDecision::Redirect(to) => return Step::Redirect(to, RedirectReason::RoleDenied),
        }
    }

    match matched.screen {
        Screen::Login => login_screen(session, role),
        Screen::Dashboard => dispatch_landing(role),
        _ => Step::Render,
    }
}

/// The login screen renders only for visitors without a credential.
fn login_screen(session: &SessionSnapshot, role: &ResolvedRole) -> Step {
    match AuthenticationGuard::default().state(session) {
        AuthGuardState::Pending => Step::Pending,
        AuthGuardState::Unauthenticated => Step::Render,
        AuthGuardState::Authenticated => match role {
            ResolvedRole::Role(r) if r.is_channel_allowed() => {
                Step::Redirect(LANDING_PATH, RedirectReason::AlreadySignedIn)
            }
            ResolvedRole::Role(_) => Step::Redirect(UNAUTHORIZED_PATH, RedirectReason::NotEntitled),
            ResolvedRole::Unresolved => Step::Pending,
            ResolvedRole::None => Step::Render,
        },
    }
}

/// `/dashboard` sends each role to its home.
fn dispatch_landing(role: &ResolvedRole) -> Step {
    match role {
        ResolvedRole::Role(Role::Backoffice) => {
            Step::Redirect(BACKOFFICE_HOME_PATH, RedirectReason::Landing)
        }
        ResolvedRole::Role(Role::Operator) => {
            Step::Redirect(OPERATOR_HOME_PATH, RedirectReason::Landing)
        }
        ResolvedRole::Role(Role::Other(_)) => {
            Step::Redirect(UNAUTHORIZED_PATH, RedirectReason::NotEntitled)
        }
        ResolvedRole::Unresolved => Step::Pending,
        ResolvedRole::None => Step::Redirect(LOGIN_PATH, RedirectReason::Unauthenticated),
    }
}
