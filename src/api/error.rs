// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resource API errors.

use reqwest::StatusCode;
use serde_json::Value;

/// Longest raw response body quoted in an error message.
const MAX_BODY_IN_MESSAGE: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The API answered 401; the session has been cleared
    #[error("Session expired")]
    SessionExpired,

    /// Any other non-success status
    #[error("Request failed ({status}): {message}")]
    Status { status: u16, message: String },

    /// No response (connection refused, timeout, TLS)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Success status but a body that did not decode
    #[error("Unexpected response body: {0}")]
    InvalidBody(String),

    #[error("Invalid API path: {0}")]
    InvalidPath(#[from] url::ParseError),
}

impl ApiError {
    /// Build a `Status` error from a failed response body.
    ///
    /// Prefers a `message`, `error` or `title` field when the body is JSON.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            message: error_message(status, body),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::SessionExpired => "session_expired",
            ApiError::Status { .. } => "request_failed",
            ApiError::Transport(_) => "transport_error",
            ApiError::InvalidBody(_) => "invalid_body",
            ApiError::InvalidPath(_) => "invalid_path",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::SessionExpired => Some(StatusCode::UNAUTHORIZED.as_u16()),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for field in ["message", "error", "title"] {
            if let Some(Value::String(text)) = map.get(field) {
                if !text.trim().is_empty() {
                    return text.clone();
                }
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        return status.canonical_reason().unwrap_or("error").to_string();
    }
    body.chars().take(MAX_BODY_IN_MESSAGE).collect()
}
