// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role resolution from the current session.
//!
//! The credential and its role never become available atomically: between a
//! credential appearing and its claims being read there is a gap. That gap is
//! reported as [`ResolvedRole::Unresolved`], never as [`ResolvedRole::None`],
//! so a guard waits instead of redirecting.

use tokio::sync::watch;
use tracing::debug;

use super::Role;
use crate::session::SessionSnapshot;

/// Role of the current visitor, as far as the client can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRole {
    /// Credential present (or hydration pending) but no role available yet
    Unresolved,
    /// No credential
    None,
    /// Role decoded from the credential
    Role(Role),
}

impl ResolvedRole {
    /// Derive the role from a session snapshot.
    ///
    /// A credential that fails to decode, or decodes without a role claim,
    /// stays `Unresolved`: a decode failure must not look like "signed out".
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        if !snapshot.is_hydrated() {
            return ResolvedRole::Unresolved;
        }
        let Some(credential) = snapshot.credential() else {
            return ResolvedRole::None;
        };
        match credential.claims() {
            Ok(claims) => match claims.role() {
                Some(role) => ResolvedRole::Role(role),
                None => {
                    debug!("Credential carries no role claim");
                    ResolvedRole::Unresolved
                }
            },
            Err(e) => {
                debug!(error = %e, "Credential claims could not be decoded");
                ResolvedRole::Unresolved
            }
        }
    }

    pub fn role(&self) -> Option<&Role> {
        match self {
            ResolvedRole::Role(role) => Some(role),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, ResolvedRole::Unresolved)
    }
}

/// Stateless view of the session's role.
///
/// Holds only a subscription; every read recomputes from the latest snapshot.
#[derive(Debug, Clone)]
pub struct RoleResolver {
    session: watch::Receiver<SessionSnapshot>,
}

impl RoleResolver {
    pub fn new(session: watch::Receiver<SessionSnapshot>) -> Self {
        Self { session }
    }

    /// Role right now.
    pub fn role(&self) -> ResolvedRole {
        ResolvedRole::from_snapshot(&self.session.borrow())
    }

    /// Wait for the next session mutation and return the role it yields.
    ///
    /// Returns `None` once the session store has been dropped.
    pub async fn changed(&mut self) -> Option<ResolvedRole> {
        self.session.changed().await.ok()?;
        Some(ResolvedRole::from_snapshot(&self.session.borrow_and_update()))
    }

    /// Wait until the role is no longer `Unresolved`.
    ///
    /// Returns `None` if the session store is dropped first.
    pub async fn resolved(&mut self) -> Option<ResolvedRole> {
        let snapshot = self
            .session
            .wait_for(|s| !ResolvedRole::from_snapshot(s).is_unresolved())
            .await
            .ok()?;
        Some(ResolvedRole::from_snapshot(&snapshot))
    }
}
