// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end portal scenarios against an in-process API.

use std::sync::Arc;

use axum::{
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use ev_portal_session::api::ApiError;
use ev_portal_session::auth::error::CHANNEL_NOT_ALLOWED_NOTICE;
use ev_portal_session::auth::{AuthError, LoginForm, LoginOutcome, ResolvedRole, Role};
use ev_portal_session::config::{PortalConfig, API_BASE_URL_ENV};
use ev_portal_session::routing::{RedirectReason, Screen, LANDING_PATH, LOGIN_PATH};
use ev_portal_session::storage::MemoryStore;
use ev_portal_session::PortalState;

fn mint_token(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{claims}.fake_signature")
}

fn operator_token() -> String {
    mint_token(json!({ "sub": "opuser", "role": "Operator", "exp": 9999999999i64 }))
}

fn backoffice_token() -> String {
    mint_token(json!({ "sub": "bo", "role": "Backoffice", "exp": 9999999999i64 }))
}

fn owner_token() -> String {
    mint_token(json!({ "sub": "owner1", "role": "ev_owner" }))
}

/// Fake portal API: three accounts, a profile endpoint that insists on a
/// bearer header, and a station list that always rejects the credential.
fn api() -> Router {
    Router::new()
        .route(
            "/api/auth/login",
            post(|Json(body): Json<Value>| async move {
                let username = body["username"].as_str().unwrap_or_default();
                let password = body["password"].as_str().unwrap_or_default();
                match (username, password) {
                    ("opuser", "secret1") => (
                        StatusCode::OK,
                        Json(json!({ "token": operator_token(), "role": "Operator" })),
                    ),
                    ("bouser", "secret1") => (
                        StatusCode::OK,
                        Json(json!({ "token": backoffice_token() })),
                    ),
                    ("owner1", "secret1") => {
                        (StatusCode::OK, Json(json!({ "token": owner_token() })))
                    }
                    _ => (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "message": "Invalid credentials" })),
                    ),
                }
            }),
        )
        .route(
            "/api/users/me/profile",
            get(|headers: HeaderMap| async move {
                if headers.contains_key("authorization") {
                    (StatusCode::OK, Json(json!({ "username": "bo", "fullName": "Back Office" })))
                } else {
                    (StatusCode::UNAUTHORIZED, Json(json!({})))
                }
            }),
        )
        .route("/api/stations", get(|| async { StatusCode::UNAUTHORIZED }))
}

async fn portal() -> PortalState {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api()).await.unwrap();
    });

    let base = format!("http://{addr}/api");
    let config =
        PortalConfig::from_lookup(|name| (name == API_BASE_URL_ENV).then(|| base.clone())).unwrap();
    PortalState::with_store(config, Arc::new(MemoryStore::new())).unwrap()
}

async fn login(state: &PortalState, username: &str) -> LoginOutcome {
    state
        .login_flow()
        .submit(&LoginForm::new(username, "secret1"), &CancellationToken::new())
        .await
}

#[tokio::test]
async fn operator_login_opens_operator_home_only() {
    let state = portal().await;

    let outcome = login(&state, "opuser").await;
    assert_eq!(
        outcome,
        LoginOutcome::Accepted {
            role: Role::Operator,
            redirect_to: LANDING_PATH,
        }
    );
    assert_eq!(
        state.session.current_token().map(|c| c.as_str().to_string()),
        Some(operator_token())
    );

    let navigator = state.navigator();
    let home = navigator.resolve("/operator").unwrap();
    assert_eq!(home.rendered(), Some(Screen::OperatorHome));
    assert!(home.redirects.is_empty());

    let denied = navigator.resolve("/backoffice").unwrap();
    assert_eq!(denied.redirects[0].to, LANDING_PATH);
    assert_eq!(denied.redirects[0].reason, RedirectReason::RoleDenied);
    assert_eq!(denied.rendered(), Some(Screen::OperatorHome));
}

#[tokio::test]
async fn disallowed_role_stays_on_login_with_notice() {
    let state = portal().await;

    let outcome = login(&state, "owner1").await;
    let LoginOutcome::Rejected(err) = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(
        err,
        AuthError::ChannelNotAllowed {
            role: "ev_owner".to_string()
        }
    );
    assert_eq!(err.user_message(), CHANNEL_NOT_ALLOWED_NOTICE);

    assert!(state.session.current_token().is_none());
    let nav = state.navigator().resolve(LOGIN_PATH).unwrap();
    assert_eq!(nav.rendered(), Some(Screen::Login));
    assert!(nav.redirects.is_empty());
}

#[tokio::test]
async fn backoffice_profile_and_operator_home() {
    let state = portal().await;
    assert!(matches!(
        login(&state, "bouser").await,
        LoginOutcome::Accepted { role: Role::Backoffice, .. }
    ));

    let navigator = state.navigator();
    assert_eq!(
        navigator.resolve("/me/profile").unwrap().rendered(),
        Some(Screen::MyProfile)
    );

    let nav = navigator.resolve("/operator").unwrap();
    assert_eq!(nav.redirects[0].to, LANDING_PATH);
    assert_eq!(nav.rendered(), Some(Screen::BackofficeHome));

    let profile = state.api.my_profile().await.unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Back Office"));
}

#[tokio::test]
async fn bad_password_reports_provider_status() {
    let state = portal().await;
    let outcome = state
        .login_flow()
        .submit(&LoginForm::new("opuser", "wrong-pass"), &CancellationToken::new())
        .await;
    assert_eq!(outcome, LoginOutcome::Rejected(AuthError::rejected_by_provider(401)));
    assert!(state.session.current_token().is_none());
}

#[tokio::test]
async fn rejected_credential_sends_visitor_back_to_login() {
    let state = portal().await;
    login(&state, "opuser").await;
    assert_eq!(
        state.navigator().resolve("/stations").unwrap().rendered(),
        Some(Screen::Stations)
    );

    let err = state.api.get_json::<Value>("stations").await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));

    let nav = state.navigator().resolve("/stations").unwrap();
    assert_eq!(nav.rendered(), Some(Screen::Login));
    assert_eq!(nav.redirects[0].reason, RedirectReason::Unauthenticated);
}

#[tokio::test]
async fn sign_in_is_visible_to_the_very_next_navigation() {
    let state = portal().await;
    let resolver = state.session.role_resolver();
    assert_eq!(resolver.role(), ResolvedRole::None);

    let LoginOutcome::Accepted { redirect_to, .. } = login(&state, "opuser").await else {
        panic!("login should be accepted");
    };
    let nav = state.navigator().resolve(redirect_to).unwrap();
    assert!(nav
        .redirects
        .iter()
        .all(|r| r.reason != RedirectReason::Unauthenticated));
    assert_eq!(nav.rendered(), Some(Screen::OperatorHome));
    assert_eq!(resolver.role(), ResolvedRole::Role(Role::Operator));
}

#[tokio::test]
async fn repeated_sign_out_is_harmless() {
    let state = portal().await;
    login(&state, "bouser").await;

    for _ in 0..3 {
        state.session.sign_out();
        let nav = state.navigator().resolve("/owners").unwrap();
        assert_eq!(nav.rendered(), Some(Screen::Login));
    }
}

#[tokio::test]
async fn signed_out_visitor_cannot_reach_any_gated_route() {
    let state = portal().await;
    let navigator = state.navigator();
    for route in navigator.routes().routes() {
        if !route.access().requires_credential() {
            continue;
        }
        let nav = navigator.resolve(&route.sample_path()).unwrap();
        assert_eq!(nav.final_path(), LOGIN_PATH, "{}", route.pattern());
        assert_eq!(nav.rendered(), Some(Screen::Login), "{}", route.pattern());
    }
}
