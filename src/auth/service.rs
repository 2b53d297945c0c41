// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication service client.
//!
//! `POST {api}/auth/login` with `{ username, password }` returns
//! `{ token, role?, username? }`. Any non-success status surfaces as
//! [`AuthError::AuthenticationFailed`] carrying that status.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::AuthError;
use crate::api::endpoint;

/// Path of the login endpoint, relative to the API base URL.
pub const LOGIN_PATH: &str = "auth/login";

#[derive(Clone, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Successful login response.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// Signed bearer credential
    pub token: String,
    /// Explicit role, preferred over the credential's claims when present
    #[serde(default)]
    pub role: Option<String>,
    /// Display name of the account
    #[serde(default)]
    pub username: Option<String>,
}

impl LoginResponse {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            role: None,
            username: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .field("username", &self.username)
            .finish()
    }
}

/// Exchanges credentials for a bearer token.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError>;
}

#[async_trait]
impl<T: AuthService + ?Sized> AuthService for Arc<T> {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        (**self).login(username, password).await
    }
}

/// HTTP implementation against the portal's REST API.
#[derive(Debug, Clone)]
pub struct HttpAuthService {
    login_url: Url,
    http: Client,
}

impl HttpAuthService {
    /// Create a client for the API rooted at `api_base`.
    pub fn new(api_base: &Url, http: Client) -> Result<Self, url::ParseError> {
        Ok(Self {
            login_url: endpoint(api_base, LOGIN_PATH)?,
            http,
        })
    }

    pub fn login_url(&self) -> &Url {
        &self.login_url
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let response = self
            .http
            .post(self.login_url.clone())
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|e| {
                debug!(error = %e, "Authentication service unreachable");
                AuthError::unreachable("could not reach the authentication service")
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::rejected_by_provider(status.as_u16()));
        }

        response.json::<LoginResponse>().await.map_err(|e| {
            debug!(error = %e, "Unexpected login response body");
            AuthError::AuthenticationFailed {
                status: Some(status.as_u16()),
                message: "Login failed: unexpected response from the authentication service"
                    .to_string(),
            }
        })
    }
}
