// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Login Flow
//!
//! ```text
//! Idle ──submit──▶ Submitting ──▶ Accepted
//!  ▲                   │
//!  └──── dismiss ── Rejected
//! ```
//!
//! 1. The form is shape-checked against [`LoginPolicy`]
//! 2. The authentication service is called
//! 3. A role is taken from the response, or decoded from the credential
//! 4. The role must be entitled to the channel (`Backoffice` or `Operator`)
//! 5. Only then is the session committed with `SessionStore::sign_in`
//!
//! Step 4 is what keeps a disallowed-but-valid credential out of the session
//! store. Such a visitor stays unauthenticated for this portal and lands on the
//! login screen once, with a notice, instead of cycling between `/login` and
//! `/dashboard`.

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{AuthError, AuthService, Credential, LoginResponse, Role};
use crate::routing::LANDING_PATH;
use crate::session::SessionStore;

/// Shape rules for the login form.
///
/// These are usability thresholds, not security controls; the authentication
/// service makes the real decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginPolicy {
    pub min_username_len: usize,
    pub min_password_len: usize,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            min_username_len: 3,
            min_password_len: 6,
        }
    }
}

/// Validation failure for one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Submitted credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check the form against `policy`, reporting every failing field.
    pub fn validate(&self, policy: &LoginPolicy) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let username = self.username.trim();
        if username.chars().count() < policy.min_username_len {
            errors.push(FieldError {
                field: "username",
                message: format!(
                    "Username must be at least {} characters",
                    policy.min_username_len
                ),
            });
        }
        if self.password.chars().count() < policy.min_password_len {
            errors.push(FieldError {
                field: "password",
                message: format!(
                    "Password must be at least {} characters",
                    policy.min_password_len
                ),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where the login flow currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Submitting,
    Accepted {
        role: Role,
        subject: Option<String>,
    },
    Rejected(AuthError),
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Session committed; navigate to `redirect_to`
    Accepted {
        role: Role,
        redirect_to: &'static str,
    },
    /// Nothing committed; show `AuthError::user_message()`
    Rejected(AuthError),
    /// Form failed shape validation; the service was not called
    Invalid(Vec<FieldError>),
    /// The originating view went away before the service answered
    Abandoned,
}

/// Credential that passed the channel allowlist.
struct Admission {
    credential: Credential,
    role: Role,
    subject: Option<String>,
}

/// Login state machine for one login screen.
pub struct LoginFlow<A> {
    service: A,
    session: SessionStore,
    policy: LoginPolicy,
    state: LoginState,
}

impl<A: AuthService> LoginFlow<A> {
    pub fn new(service: A, session: SessionStore) -> Self {
        Self {
            service,
            session,
            policy: LoginPolicy::default(),
            state: LoginState::Idle,
        }
    }

    pub fn with_policy(mut self, policy: LoginPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    pub fn policy(&self) -> &LoginPolicy {
        &self.policy
    }

    /// Dismiss a rejection notice.
    pub fn dismiss(&mut self) {
        if matches!(self.state, LoginState::Rejected(_)) {
            self.state = LoginState::Idle;
        }
    }

    /// Submit the form.
    ///
    /// `view` is cancelled when the login screen is torn down. A result that
    /// arrives after that is dropped without touching the session.
    ///
    /// On `Accepted` the session has already published the new credential,
    /// so navigating to `redirect_to` right away is safe.
    pub async fn submit(&mut self, form: &LoginForm, view: &CancellationToken) -> LoginOutcome {
        if let Err(errors) = form.validate(&self.policy) {
            self.state = LoginState::Idle;
            return LoginOutcome::Invalid(errors);
        }

        let username = form.username.trim();
        self.state = LoginState::Submitting;
        debug!(username, "Submitting login");

        let response = tokio::select! {
            biased;
            _ = view.cancelled() => None,
            result = self.service.login(username, &form.password) => Some(result),
        };

        let Some(response) = response.filter(|_| !view.is_cancelled()) else {
            debug!(username, "Login view gone, discarding result");
            self.state = LoginState::Idle;
            return LoginOutcome::Abandoned;
        };

        let admission = response.and_then(admit).and_then(|admission| {
            self.session
                .sign_in_credential(admission.credential.clone())
                .map(|()| admission)
        });

        match admission {
            Ok(Admission { role, subject, .. }) => {
                info!(username, role = %role, "Login accepted");
                self.state = LoginState::Accepted {
                    role: role.clone(),
                    subject,
                };
                LoginOutcome::Accepted {
                    role,
                    redirect_to: LANDING_PATH,
                }
            }
            Err(err) => {
                warn!(username, code = err.error_code(), "Login rejected");
                self.state = LoginState::Rejected(err.clone());
                LoginOutcome::Rejected(err)
            }
        }
    }
}

/// Decide whether an issued credential may enter this channel.
///
/// The guards only ever see the role decoded from the credential, so the
/// credential must carry an entitled role of its own. An explicit role in the
/// response is checked as well; it can narrow admission but never widen it.
fn admit(response: LoginResponse) -> Result<Admission, AuthError> {
    let credential = Credential::new(response.token)?;
    let claims = credential.claims()?;
    let role = claims.role().ok_or(AuthError::MalformedCredential)?;

    let explicit = response
        .role
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .map(Role::parse);

    for candidate in explicit.iter().chain(std::iter::once(&role)) {
        if !candidate.is_channel_allowed() {
            return Err(AuthError::ChannelNotAllowed {
                role: candidate.to_string(),
            });
        }
    }
    if let Some(explicit) = explicit.filter(|e| *e != role) {
        debug!(explicit = %explicit, decoded = %role, "Response role differs from credential");
    }

    let subject = claims
        .subject()
        .map(str::to_string)
        .or(response.username);

    Ok(Admission {
        credential,
        role,
        subject,
    })
}
