// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

/// Notice shown when a valid credential belongs to a role this portal does not serve.
pub const CHANNEL_NOT_ALLOWED_NOTICE: &str = "This channel is not available for your account type.";

/// Authentication error type.
///
/// None of these are fatal: the login flow turns them into a notice on the
/// login screen, and the guards turn them into a redirect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Credential could not be decoded (or carried no usable role)
    #[error("Credential is malformed")]
    MalformedCredential,

    /// Bad credentials, service error, or the service was unreachable
    #[error("{message}")]
    AuthenticationFailed {
        /// HTTP status from the provider, if one was received
        status: Option<u16>,
        message: String,
    },

    /// Valid credential, but its role is not entitled to this channel
    #[error("Role '{role}' is not entitled to this channel")]
    ChannelNotAllowed { role: String },

    /// The resource API rejected the bearer credential
    #[error("Session has expired")]
    SessionExpired,

    /// Credential could not be written to the persistent store
    #[error("Failed to persist session: {0}")]
    Persistence(String),
}

impl AuthError {
    /// Failure reported by the authentication service with an HTTP status.
    pub fn rejected_by_provider(status: u16) -> Self {
        AuthError::AuthenticationFailed {
            status: Some(status),
            message: format!("Login failed ({status})"),
        }
    }

    /// Failure before any response was received.
    pub fn unreachable(detail: impl std::fmt::Display) -> Self {
        AuthError::AuthenticationFailed {
            status: None,
            message: format!("Login failed: {detail}"),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedCredential => "malformed_credential",
            AuthError::AuthenticationFailed { .. } => "authentication_failed",
            AuthError::ChannelNotAllowed { .. } => "channel_not_allowed",
            AuthError::SessionExpired => "session_expired",
            AuthError::Persistence(_) => "persistence_failed",
        }
    }

    /// Text for the dismissable notice on the login screen.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::MalformedCredential => {
                "The sign-in response could not be read. Please try again.".to_string()
            }
            AuthError::AuthenticationFailed { message, .. } => message.clone(),
            AuthError::ChannelNotAllowed { .. } => CHANNEL_NOT_ALLOWED_NOTICE.to_string(),
            AuthError::SessionExpired => {
                "Your session has expired. Please sign in again.".to_string()
            }
            AuthError::Persistence(_) => {
                "Your session could not be saved on this device.".to_string()
            }
        }
    }
}
