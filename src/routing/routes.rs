// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route table for the staff portal.
//!
//! ## Route Surface
//!
//! | Access | Paths |
//! |--------|-------|
//! | Public | `/`, `/login` |
//! | Authenticated | `/dashboard`, `/unauthorized` |
//! | Backoffice | `/backoffice`, `/register`, `/owners`, `/owners/new`, `/owners/:id` |
//! | Backoffice | `/stations`, `/stations/new`, `/stations/:id` |
//! | Backoffice | `/stations/:id/schedule` |
//! | Operator | `/operator`, `/stations`, `/stations/:id/schedule` |
//! | Backoffice or Operator | `/me/profile` |
//!
//! Unmatched paths fall back to `/login`.

use std::collections::BTreeMap;

use tracing::warn;

use crate::auth::{AllowedRoles, Role};

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
/// Landing route after sign-in; dispatches by role.
pub const LANDING_PATH: &str = "/dashboard";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const BACKOFFICE_HOME_PATH: &str = "/backoffice";
pub const OPERATOR_HOME_PATH: &str = "/operator";

/// Screens the portal can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Dashboard,
    Unauthorized,
    BackofficeHome,
    RegisterStaff,
    Owners,
    NewOwner,
    OwnerDetail,
    Stations,
    NewStation,
    StationDetail,
    StationSchedule,
    OperatorHome,
    MyProfile,
}

/// Who may enter a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Anyone
    Public,
    /// Any visitor holding a credential
    Authenticated,
    /// Credential holders whose role is in the set
    Roles(AllowedRoles),
}

impl Access {
    pub fn requires_credential(&self) -> bool {
        !matches!(self, Access::Public)
    }

    /// Combine the access rules of two declarations of the same path.
    fn merge(&self, other: &Access) -> Access {
        match (self, other) {
            (Access::Roles(a), Access::Roles(b)) => Access::Roles(a.union(b)),
            (Access::Public, _) | (_, Access::Public) => Access::Public,
            _ => Access::Authenticated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// One declared route.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    segments: Vec<Segment>,
    screen: Screen,
    access: Access,
}

impl Route {
    fn new(pattern: &str, screen: Screen, access: Access) -> Self {
        let segments = split_path(pattern)
            .into_iter()
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Static(s.to_string()),
            })
            .collect();
        Self {
            pattern: normalize_path(pattern),
            segments,
            screen,
            access,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn access(&self) -> &Access {
        &self.access
    }

    /// Example concrete path for this route (`:param` becomes `1`).
    pub fn sample_path(&self) -> String {
        let parts: Vec<&str> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Static(s) => s.as_str(),
                Segment::Param(_) => "1",
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    fn matches(&self, parts: &[&str]) -> Option<BTreeMap<String, String>> {
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(s) if s == part => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*part).to_string());
                }
            }
        }
        Some(params)
    }

    /// Static segments outrank parameters (`/stations/new` over `/stations/:id`).
    fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Static(_)))
            .count()
    }
}

/// A path resolved against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Normalized requested path
    pub path: String,
    pub pattern: String,
    pub screen: Screen,
    pub access: Access,
    pub params: BTreeMap<String, String>,
}

/// Static routing configuration.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// The portal's route tree.
    pub fn portal() -> Self {
        let backoffice = AllowedRoles::of([Role::Backoffice]);
        let operator = AllowedRoles::of([Role::Operator]);

        RouteTable::builder()
            .public(&[(ROOT_PATH, Screen::Login), (LOGIN_PATH, Screen::Login)])
            .authenticated(&[
                (LANDING_PATH, Screen::Dashboard),
                (UNAUTHORIZED_PATH, Screen::Unauthorized),
            ])
            .with_roles(
                backoffice,
                &[
                    (BACKOFFICE_HOME_PATH, Screen::BackofficeHome),
                    ("/register", Screen::RegisterStaff),
                    ("/owners", Screen::Owners),
                    ("/owners/new", Screen::NewOwner),
                    ("/owners/:id", Screen::OwnerDetail),
                    ("/stations", Screen::Stations),
                    ("/stations/new", Screen::NewStation),
                    ("/stations/:id", Screen::StationDetail),
                    ("/stations/:id/schedule", Screen::StationSchedule),
                ],
            )
            .with_roles(
                operator,
                &[
                    (OPERATOR_HOME_PATH, Screen::OperatorHome),
                    ("/stations", Screen::Stations),
                    ("/stations/:id/schedule", Screen::StationSchedule),
                ],
            )
            .with_roles(AllowedRoles::channel(), &[("/me/profile", Screen::MyProfile)])
            .build()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the most specific route for `path`.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let normalized = normalize_path(path);
        let parts = split_path(&normalized);

        let mut best: Option<(&Route, BTreeMap<String, String>)> = None;
        for route in &self.routes {
            let Some(params) = route.matches(&parts) else {
                continue;
            };
            let better = match &best {
                Some((current, _)) => route.specificity() > current.specificity(),
                None => true,
            };
            if better {
                best = Some((route, params));
            }
        }

        best.map(|(route, params)| RouteMatch {
            path: normalized,
            pattern: route.pattern.clone(),
            screen: route.screen,
            access: route.access.clone(),
            params,
        })
    }
}

/// Builds a [`RouteTable`] scope by scope, like nested guards in a route tree.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
}

impl RouteTableBuilder {
    /// Declare one route.
    ///
    /// Declaring a pattern twice merges the two: role sets are united, so a
    /// path listed under both the Backoffice and the Operator subtree admits
    /// both roles.
    pub fn route(mut self, pattern: &str, screen: Screen, access: Access) -> Self {
        let route = Route::new(pattern, screen, access);
        match self.routes.iter_mut().find(|r| r.pattern == route.pattern) {
            Some(existing) => {
                if existing.screen != route.screen {
                    warn!(
                        pattern = %route.pattern,
                        "Route declared twice with different screens, keeping the first"
                    );
                }
                existing.access = existing.access.merge(&route.access);
            }
            None => self.routes.push(route),
        }
        self
    }

    pub fn public(self, routes: &[(&str, Screen)]) -> Self {
        self.scope(Access::Public, routes)
    }

    pub fn authenticated(self, routes: &[(&str, Screen)]) -> Self {
        self.scope(Access::Authenticated, routes)
    }

    pub fn with_roles(self, allowed: AllowedRoles, routes: &[(&str, Screen)]) -> Self {
        self.scope(Access::Roles(allowed), routes)
    }

    fn scope(self, access: Access, routes: &[(&str, Screen)]) -> Self {
        routes.iter().fold(self, |builder, (pattern, screen)| {
            builder.route(pattern, *screen, access.clone())
        })
    }

    pub fn build(self) -> RouteTable {
        RouteTable {
            routes: self.routes,
        }
    }
}

/// Drop query and fragment, collapse slashes, and strip the trailing slash.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    format!("/{}", split_path(path).join("/"))
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
