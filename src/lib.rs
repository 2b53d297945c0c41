// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EV Portal Session - session and route authorization for the EV staff portal
//!
//! Client-side identity for the charging network's staff channel. Backoffice
//! and Operator accounts sign in here; every other role is turned away at
//! login. The API remains the authority on every request.
//!
//! ## Modules
//!
//! - `auth` - Claims, roles, the login flow, and role resolution
//! - `session` - Credential lifecycle and change broadcast
//! - `routing` - Route table, guards, and redirect resolution
//! - `api` - Bearer-authenticated resource client
//! - `storage` - Persistent key-value backends for the session
//! - `config` / `logging` - Environment configuration and tracing setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod routing;
pub mod session;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use error::{PortalError, PortalResult};
pub use session::{SessionSnapshot, SessionStore};
pub use state::PortalState;
