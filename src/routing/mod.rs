// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Routing
//!
//! Declarative route table, the two route guards, and the navigator that
//! follows redirects until a screen renders or the session is still settling.
//!
//! Guard order on a role route: authentication first, then role. A denied
//! role goes to `/dashboard`, which dispatches by role; a role that may not
//! use this channel at all ends on `/unauthorized`.

pub mod guards;
pub mod navigator;
pub mod routes;

pub use guards::{AuthGuardState, AuthenticationGuard, GuardDecision, RoleGuard, RoleGuardState};
pub use navigator::{
    resolve_path, Navigation, NavigationError, Navigator, Redirect, RedirectReason, Resolution,
    MAX_REDIRECTS,
};
pub use routes::{
    normalize_path, Access, Route, RouteMatch, RouteTable, RouteTableBuilder, Screen,
    BACKOFFICE_HOME_PATH, LANDING_PATH, LOGIN_PATH, OPERATOR_HOME_PATH, ROOT_PATH,
    UNAUTHORIZED_PATH,
};
