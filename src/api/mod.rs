// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client side of the portal's REST API.
//!
//! All endpoints hang off one base URL (`EV_API_BASE_URL`, for example
//! `https://localhost:7217/api/`).

use url::Url;

pub mod client;
pub mod error;
pub mod profile;

pub use client::ResourceClient;
pub use error::ApiError;
pub use profile::{PasswordChange, ProfileUpdate, StaffProfile};

/// Join `path` onto the API base.
///
/// Leading slashes on `path` are ignored, so `/auth/login` and `auth/login`
/// both land under the base rather than at the host root.
pub fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let relative = path.trim_start_matches('/');
    if base.path().ends_with('/') {
        return base.join(relative);
    }
    let mut base = base.clone();
    let with_slash = format!("{}/", base.path());
    base.set_path(&with_slash);
    base.join(relative)
}
