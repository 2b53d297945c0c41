// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route guards.
//!
//! Both guards are three-state. `Pending` renders nothing and never
//! redirects; it covers hydration and the window between a credential
//! appearing and its role being decoded.

use crate::auth::{AllowedRoles, ResolvedRole};
use crate::session::SessionSnapshot;

use super::{LANDING_PATH, LOGIN_PATH};

/// What a guard tells the router to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Pending,
    Redirect(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGuardState {
    Pending,
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGuardState {
    Pending,
    Permitted,
    Denied,
}

/// Admits any visitor holding a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticationGuard {
    login_path: &'static str,
}

impl Default for AuthenticationGuard {
    fn default() -> Self {
        Self {
            login_path: LOGIN_PATH,
        }
    }
}

impl AuthenticationGuard {
    pub fn state(&self, session: &SessionSnapshot) -> AuthGuardState {
        if !session.is_hydrated() {
            AuthGuardState::Pending
        } else if session.has_credential() {
            AuthGuardState::Authenticated
        } else {
            AuthGuardState::Unauthenticated
        }
    }

    pub fn decide(&self, session: &SessionSnapshot) -> GuardDecision {
        match self.state(session) {
            AuthGuardState::Pending => GuardDecision::Pending,
            AuthGuardState::Authenticated => GuardDecision::Render,
            AuthGuardState::Unauthenticated => GuardDecision::Redirect(self.login_path),
        }
    }
}

/// Admits visitors whose resolved role is in `allowed`.
///
/// Denied visitors go to the landing route, which sends the unauthenticated
/// to `/login` and everyone else to their own home.
#[derive(Debug, Clone, Copy)]
pub struct RoleGuard<'a> {
    allowed: &'a AllowedRoles,
    denied_path: &'static str,
}

impl<'a> RoleGuard<'a> {
    pub fn new(allowed: &'a AllowedRoles) -> Self {
        Self {
            allowed,
            denied_path: LANDING_PATH,
        }
    }

    pub fn state(&self, role: &ResolvedRole) -> RoleGuardState {
        match role {
            ResolvedRole::Unresolved => RoleGuardState::Pending,
            ResolvedRole::None => RoleGuardState::Denied,
            ResolvedRole::Role(role) if self.allowed.contains(role) => RoleGuardState::Permitted,
            ResolvedRole::Role(_) => RoleGuardState::Denied,
        }
    }

    pub fn decide(&self, role: &ResolvedRole) -> GuardDecision {
        match self.state(role) {
            RoleGuardState::Pending => GuardDecision::Pending,
            RoleGuardState::Permitted => GuardDecision::Render,
            RoleGuardState::Denied => GuardDecision::Redirect(self.denied_path),
        }
    }
}
