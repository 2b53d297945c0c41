// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Store
//!
//! Single owner of the current credential. Every mutation is broadcast on a
//! `tokio::sync::watch` channel, so the role resolver, guards and navigator
//! observe sign-in and sign-out without polling.
//!
//! ## Lifecycle
//!
//! 1. `SessionStore::new` - empty, *not hydrated* (guards report `Pending`)
//! 2. `hydrate()` - reads [`ACCESS_TOKEN_KEY`] from the persistent store
//! 3. `sign_in()` / `sign_out()` / `expire()` / `expire_if()` - the only mutations
//! 4. drop - the channel closes and subscribers see `changed()` fail
//!
//! `SessionStore::open` performs steps 1 and 2 together, which is what an
//! application does before evaluating its first navigation.
//!
//! ## Ordering
//!
//! Mutations publish synchronously before returning. Anything the caller does
//! after `sign_in` returns (such as navigating to the landing route) already
//! sees the new snapshot. Writes to the persistent store happen while the
//! channel's write lock is held, so memory and storage never disagree about
//! which credential is current.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::auth::{AuthError, Credential, RoleResolver};
use crate::storage::{KeyValueStore, ACCESS_TOKEN_KEY};

/// Point-in-time view of the session, as broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    hydrated: bool,
    credential: Option<Credential>,
}

impl SessionSnapshot {
    /// Snapshot before the persistent store has been read.
    pub fn unhydrated() -> Self {
        Self::default()
    }

    /// Hydrated snapshot with no credential.
    pub fn signed_out() -> Self {
        Self {
            hydrated: true,
            credential: None,
        }
    }

    /// Hydrated snapshot holding `credential`.
    pub fn signed_in(credential: Credential) -> Self {
        Self {
            hydrated: true,
            credential: Some(credential),
        }
    }

    /// Whether the persistent store has been read.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }
}

struct Inner {
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<SessionSnapshot>,
}

/// Injectable session context.
///
/// Cheap to clone; all clones share one state and one broadcast channel.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Create an unhydrated session over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::unhydrated());
        Self {
            inner: Arc::new(Inner { store, state }),
        }
    }

    /// Create a session and hydrate it eagerly.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let session = Self::new(store);
        session.hydrate();
        session
    }

    /// Restore the persisted credential, once.
    ///
    /// A read failure or a blank stored value hydrates as signed out; the
    /// visitor simply has to log in again. Calling this after hydration (or
    /// after a sign-in) does nothing.
    pub fn hydrate(&self) {
        if self.snapshot().is_hydrated() {
            return;
        }

        let restored = match self.inner.store.get(ACCESS_TOKEN_KEY) {
            Ok(Some(token)) => match Credential::new(token) {
                Ok(credential) => Some(credential),
                Err(_) => {
                    warn!("Discarding blank persisted credential");
                    self.remove_persisted();
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted credential, starting signed out");
                None
            }
        };

        debug!(restored = restored.is_some(), "Session hydrated");
        self.inner.state.send_if_modified(|snapshot| {
            if snapshot.hydrated {
                return false;
            }
            *snapshot = SessionSnapshot {
                hydrated: true,
                credential: restored,
            };
            true
        });
    }

    /// Become authenticated with `token`.
    ///
    /// The token is persisted first; if that fails nothing changes in memory
    /// either. No claim validation happens here: the login flow has already
    /// admitted the credential.
    pub fn sign_in(&self, token: &str) -> Result<(), AuthError> {
        let credential = Credential::new(token)?;
        self.sign_in_credential(credential)
    }

    /// Same as [`sign_in`](Self::sign_in) for an already wrapped credential.
    pub fn sign_in_credential(&self, credential: Credential) -> Result<(), AuthError> {
        let mut result = Ok(());
        self.inner.state.send_if_modified(|snapshot| {
            match self.inner.store.set(ACCESS_TOKEN_KEY, credential.as_str()) {
                Ok(()) => {
                    *snapshot = SessionSnapshot::signed_in(credential);
                    true
                }
                Err(e) => {
                    result = Err(AuthError::Persistence(e.to_string()));
                    false
                }
            }
        });
        if result.is_ok() {
            info!("Session signed in");
        }
        result
    }

    /// Clear the credential from memory and from the persistent store.
    ///
    /// Idempotent. A failure to delete the persisted copy is logged; the
    /// in-memory session is cleared regardless.
    pub fn sign_out(&self) {
        if self.clear_where(|_| true) {
            info!("Session signed out");
        }
    }

    /// Implicit sign-out after the resource API rejected the credential.
    pub fn expire(&self) {
        if self.clear_where(|_| true) {
            warn!("Session expired, credential rejected by the API");
        }
    }

    /// Expire the session only if it still holds `sent`.
    ///
    /// A rejection of a credential that has since been replaced by a new
    /// sign-in leaves the newer credential in place. Returns true if the
    /// session was cleared.
    pub fn expire_if(&self, sent: &Credential) -> bool {
        let cleared = self.clear_where(|snapshot| snapshot.credential() == Some(sent));
        if cleared {
            warn!("Session expired, credential rejected by the API");
        }
        cleared
    }

    /// Clear memory and storage if `matches` holds for the current snapshot.
    ///
    /// Runs under the channel's write lock, so no sign-in can interleave
    /// between the check and the removal. Returns true if anything changed.
    fn clear_where(&self, matches: impl FnOnce(&SessionSnapshot) -> bool) -> bool {
        self.inner.state.send_if_modified(|snapshot| {
            if !matches(snapshot) {
                return false;
            }
            self.remove_persisted();
            let changed = snapshot.credential.is_some() || !snapshot.hydrated;
            *snapshot = SessionSnapshot::signed_out();
            changed
        })
    }

    fn remove_persisted(&self) {
        if let Err(e) = self.inner.store.remove(ACCESS_TOKEN_KEY) {
            warn!(error = %e, "Failed to remove persisted credential");
        }
    }

    /// Current credential, if any.
    pub fn current_token(&self) -> Option<Credential> {
        self.inner.state.borrow().credential.clone()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Receive every subsequent mutation.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// Role resolver bound to this session.
    pub fn role_resolver(&self) -> RoleResolver {
        RoleResolver::new(self.subscribe())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("snapshot", &*self.inner.state.borrow())
            .finish()
    }
}
