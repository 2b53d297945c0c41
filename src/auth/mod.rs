// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Client-side identity for the EV staff portal.
//!
//! ## Auth Flow
//!
//! 1. Visitor submits username/password on the login screen
//! 2. The authentication service returns a signed bearer credential
//! 3. The portal:
//!    - Takes the role from the response, or decodes it from the credential
//!    - Rejects roles not entitled to this channel (only `Backoffice` and
//!      `Operator` are)
//!    - Commits the credential to the session store
//! 4. The role resolver re-derives the role from the session on every read
//!
//! ## Trust
//!
//! - Signatures are never verified client-side
//! - Claims only gate what is rendered; the API authorizes every request

pub mod claims;
pub mod error;
pub mod login;
pub mod resolver;
pub mod roles;
pub mod service;

pub use claims::{ClaimSet, Credential};
pub use error::AuthError;
pub use login::{FieldError, LoginFlow, LoginForm, LoginOutcome, LoginPolicy, LoginState};
pub use resolver::{ResolvedRole, RoleResolver};
pub use roles::{AllowedRoles, Role};
pub use service::{AuthService, HttpAuthService, LoginResponse};
