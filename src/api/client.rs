// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated client for the portal's resource API.
//!
//! Every request carries `Authorization: Bearer <token>` taken from the
//! session at send time. A `401` clears the session, provided it still holds
//! the credential that was sent; the next navigation then lands on `/login`
//! through the authentication guard.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::endpoint;
use super::error::ApiError;
use super::profile::{
    PasswordChange, ProfileUpdate, StaffProfile, MY_PASSWORD_PATH, MY_PROFILE_PATH,
};
use crate::auth::Credential;
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct ResourceClient {
    base: Url,
    http: Client,
    session: SessionStore,
}

impl ResourceClient {
    pub fn new(base: Url, http: Client, session: SessionStore) -> Self {
        Self {
            base,
            http,
            session,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Build a request with the bearer header attached, if signed in.
    ///
    /// Also returns the credential that went into the header.
    fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<(RequestBuilder, Option<Credential>), ApiError> {
        let url = endpoint(&self.base, path)?;
        let builder = self.http.request(method, url);
        let sent = self.session.current_token();
        let builder = match &sent {
            Some(credential) => builder.header(AUTHORIZATION, credential.bearer()),
            None => builder,
        };
        Ok((builder, sent))
    }

    async fn execute(
        &self,
        builder: RequestBuilder,
        sent: Option<Credential>,
        method: &Method,
        path: &str,
    ) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "API response");

        if status == StatusCode::UNAUTHORIZED {
            let cleared = sent.is_some_and(|credential| self.session.expire_if(&credential));
            if cleared {
                warn!(%method, path, "API rejected credential, signed out");
            } else {
                debug!(%method, path, "API rejected a credential that is no longer current");
            }
            return Err(ApiError::SessionExpired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        response: Response,
        method: &Method,
        path: &str,
    ) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::InvalidBody(format!("{method} {path}: {e}")))
    }

    /// `GET path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (builder, sent) = self.request(Method::GET, path)?;
        let response = self.execute(builder, sent, &Method::GET, path).await?;
        Self::decode(response, &Method::GET, path).await
    }

    /// `GET path?query` and decode the JSON body.
    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let (builder, sent) = self.request(Method::GET, path)?;
        let response = self
            .execute(builder.query(query), sent, &Method::GET, path)
            .await?;
        Self::decode(response, &Method::GET, path).await
    }

    /// Send a JSON body and decode the JSON response.
    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (builder, sent) = self.request(method.clone(), path)?;
        let response = self.execute(builder.json(body), sent, &method, path).await?;
        Self::decode(response, &method, path).await
    }

    /// Send a JSON body, decoding the response only if there is one.
    pub async fn send_json_optional<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (builder, sent) = self.request(method.clone(), path)?;
        let response = self.execute(builder.json(body), sent, &method, path).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ApiError::InvalidBody(format!("{method} {path}: {e}")))
    }

    /// Send a JSON body and ignore the response body.
    pub async fn send_empty<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let (builder, sent) = self.request(method.clone(), path)?;
        self.execute(builder.json(body), sent, &method, path).await?;
        Ok(())
    }

    /// `GET /users/me/profile`
    pub async fn my_profile(&self) -> Result<StaffProfile, ApiError> {
        self.get_json(MY_PROFILE_PATH).await
    }

    /// `PUT /users/me/profile`; returns the stored profile when the API echoes it.
    pub async fn update_my_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<Option<StaffProfile>, ApiError> {
        self.send_json_optional(Method::PUT, MY_PROFILE_PATH, update)
            .await
    }

    /// `PUT /users/me/password`
    pub async fn change_my_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        self.send_empty(Method::PUT, MY_PASSWORD_PATH, change).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_session, serve_api, signed_in_session, token_for};
    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::{get, put},
        Json, Router,
    };
    use crate::storage::{KeyValueStore, ACCESS_TOKEN_KEY};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn bearer(headers: &HeaderMap) -> Option<String> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Echoes the Authorization header, 401 when absent.
    async fn whoami(headers: HeaderMap) -> (AxumStatus, Json<Value>) {
        match bearer(&headers) {
            Some(auth) => (AxumStatus::OK, Json(json!({ "authorization": auth }))),
            None => (AxumStatus::UNAUTHORIZED, Json(json!({}))),
        }
    }

    #[tokio::test]
    async fn attaches_bearer_from_session() {
        let token = token_for("bo", "Backoffice");
        let base = serve_api(Router::new().route("/api/whoami", get(whoami))).await;
        let client = ResourceClient::new(base, Client::new(), signed_in_session(&token));

        let body: Value = client.get_json("/whoami").await.unwrap();
        assert_eq!(body["authorization"], format!("Bearer {token}"));
    }

    #[tokio::test]
    async fn header_follows_session_changes() {
        let (session, _backend) = memory_session();
        let base = serve_api(Router::new().route("/api/whoami", get(whoami))).await;
        let client = ResourceClient::new(base, Client::new(), session.clone());

        session.sign_in("first-token").unwrap();
        let body: Value = client.get_json("whoami").await.unwrap();
        assert_eq!(body["authorization"], "Bearer first-token");

        session.sign_in("second-token").unwrap();
        let body: Value = client.get_json("whoami").await.unwrap();
        assert_eq!(body["authorization"], "Bearer second-token");
    }

    #[tokio::test]
    async fn unauthorized_response_expires_session() {
        let app = Router::new().route("/api/owners", get(|| async { AxumStatus::UNAUTHORIZED }));
        let base = serve_api(app).await;
        let session = signed_in_session(&token_for("bo", "Backoffice"));
        let client = ResourceClient::new(base, Client::new(), session.clone());

        let err = client.get_json::<Value>("owners").await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert!(session.current_token().is_none());
        assert!(session.snapshot().is_hydrated());
    }

    #[tokio::test]
    async fn late_rejection_keeps_newer_sign_in() {
        let arrived = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let app = Router::new().route(
            "/api/stations",
            get({
                let arrived = arrived.clone();
                let release = release.clone();
                move || {
                    let arrived = arrived.clone();
                    let release = release.clone();
                    async move {
                        arrived.notify_one();
                        release.notified().await;
                        AxumStatus::UNAUTHORIZED
                    }
                }
            }),
        );
        let base = serve_api(app).await;
        let (session, backend) = memory_session();
        session.sign_in("old").unwrap();
        let client = ResourceClient::new(base, Client::new(), session.clone());

        let pending = tokio::spawn({
            let client = client.clone();
            async move { client.get_json::<Value>("stations").await }
        });
        arrived.notified().await;
        session.sign_in("new").unwrap();
        release.notify_one();

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(
            session.current_token().as_ref().map(Credential::as_str),
            Some("new")
        );
        assert_eq!(backend.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn other_failures_keep_session() {
        let app = Router::new().route(
            "/api/owners",
            get(|| async {
                (
                    AxumStatus::FORBIDDEN,
                    Json(json!({ "message": "Backoffice only" })),
                )
            }),
        );
        let base = serve_api(app).await;
        let session = signed_in_session(&token_for("op", "Operator"));
        let client = ResourceClient::new(base, Client::new(), session.clone());

        let err = client.get_json::<Value>("owners").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Status { status: 403, ref message } if message == "Backoffice only"
        ));
        assert!(session.current_token().is_some());
    }

    #[tokio::test]
    async fn query_parameters_are_sent() {
        let app = Router::new().route(
            "/api/admin/staff",
            get(|Query(q): Query<HashMap<String, String>>| async move { Json(json!(q)) }),
        );
        let base = serve_api(app).await;
        let client = ResourceClient::new(base, Client::new(), signed_in_session("t"));

        let echoed: HashMap<String, String> = client
            .get_json_with_query("admin/staff", &[("q", "ana"), ("page", "2")])
            .await
            .unwrap();
        assert_eq!(echoed.get("q").map(String::as_str), Some("ana"));
        assert_eq!(echoed.get("page").map(String::as_str), Some("2"));
    }

    #[tokio::test]
    async fn profile_round_trip() {
        let app = Router::new()
            .route(
                "/api/users/me/profile",
                get(|| async {
                    Json(json!({
                        "username": "opuser",
                        "fullName": "Op User",
                        "email": "op@example.com",
                        "phone": "6000000",
                        "role": "Operator"
                    }))
                })
                .put(|Json(body): Json<Value>| async move { Json(body) }),
            )
            .route(
                "/api/users/me/password",
                put(|Json(body): Json<Value>| async move {
                    if body["currentPassword"] == "old-secret" {
                        AxumStatus::NO_CONTENT
                    } else {
                        AxumStatus::BAD_REQUEST
                    }
                }),
            );
        let base = serve_api(app).await;
        let client = ResourceClient::new(base, Client::new(), signed_in_session("t"));

        let profile = client.my_profile().await.unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Op User"));

        let mut update = ProfileUpdate::from(&profile);
        update.phone = "6111111".to_string();
        let stored = client.update_my_profile(&update).await.unwrap().unwrap();
        assert_eq!(stored.phone.as_deref(), Some("6111111"));

        client
            .change_my_password(&PasswordChange::new("old-secret", "new-secret-1"))
            .await
            .unwrap();
        let err = client
            .change_my_password(&PasswordChange::new("wrong", "new-secret-1"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn empty_update_response_is_none() {
        let app = Router::new().route(
            "/api/users/me/profile",
            put(|| async { AxumStatus::NO_CONTENT }),
        );
        let base = serve_api(app).await;
        let client = ResourceClient::new(base, Client::new(), signed_in_session("t"));

        let update = ProfileUpdate {
            full_name: "Op User".into(),
            email: "op@example.com".into(),
            phone: "6000000".into(),
        };
        assert_eq!(client.update_my_profile(&update).await.unwrap(), None);
    }

    #[tokio::test]
    async fn undecodable_body_is_reported() {
        let app = Router::new().route("/api/users/me/profile", get(|| async { "not json" }));
        let base = serve_api(app).await;
        let client = ResourceClient::new(base, Client::new(), signed_in_session("t"));

        assert!(matches!(client.my_profile().await, Err(ApiError::InvalidBody(_))));
    }
}
