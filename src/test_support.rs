// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::{json, Value};

use crate::session::SessionStore;
use crate::storage::MemoryStore;

/// Create an unsigned JWT carrying `claims` (the signature is never checked).
pub fn mint_token(claims: Value) -> String {
    let header = r#"{"alg":"HS256","typ":"JWT"}"#;
    let header_b64 = URL_SAFE_NO_PAD.encode(header.as_bytes());
    let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header_b64}.{claims_b64}.fake_signature")
}

/// Token for `subject` holding a single `role` claim.
pub fn token_for(subject: &str, role: &str) -> String {
    mint_token(json!({ "sub": subject, "role": role, "exp": 9999999999i64 }))
}

/// Session store over a fresh in-memory backend, already hydrated.
pub fn memory_session() -> (SessionStore, Arc<MemoryStore>) {
    let backend = Arc::new(MemoryStore::new());
    let session = SessionStore::open(backend.clone());
    (session, backend)
}

/// Hydrated session already signed in with `token`.
pub fn signed_in_session(token: &str) -> SessionStore {
    let (session, _backend) = memory_session();
    session.sign_in(token).expect("sign in");
    session
}

/// Serve `app` on an ephemeral local port and return its `/api/` base URL.
pub async fn serve_api(app: axum::Router) -> url::Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    url::Url::parse(&format!("http://{addr}/api/")).expect("base url")
}
