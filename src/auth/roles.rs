// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Staff roles and channel entitlement.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role asserted by a credential.
///
/// ## Channel Entitlement
///
/// - `Backoffice` - Back-office administration (owners, stations, staff)
/// - `Operator` - Station operators (stations and their schedules)
/// - `Other` - Any role the authentication service issues that this portal
///   does not serve (e.g. EV owners, who use the mobile app)
///
/// Only `Backoffice` and `Operator` may hold a session in the portal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Back-office administrator
    Backoffice,
    /// Charging station operator
    Operator,
    /// Recognized by the authentication service, not entitled to this channel
    Other(String),
}

impl Role {
    /// Parse a role name (case-insensitive).
    ///
    /// Unknown names are kept verbatim in `Role::Other` so they can be shown
    /// back to the visitor.
    pub fn parse(s: &str) -> Role {
        let name = s.trim();
        match name.to_lowercase().as_str() {
            "backoffice" | "back_office" | "back-office" => Role::Backoffice,
            "operator" | "station_operator" | "stationoperator" => Role::Operator,
            _ => Role::Other(name.to_string()),
        }
    }

    /// Whether this role may hold a session in the staff portal at all.
    pub fn is_channel_allowed(&self) -> bool {
        matches!(self, Role::Backoffice | Role::Operator)
    }

    /// Canonical name, as issued by the authentication service.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Backoffice => "Backoffice",
            Role::Operator => "Operator",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::parse(&s)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles permitted to enter a route subtree.
///
/// Declared statically by the route table and consulted by the role guard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllowedRoles {
    roles: Vec<Role>,
}

impl AllowedRoles {
    /// Build an allowed-set from a list of roles (duplicates collapse).
    pub fn of(roles: impl IntoIterator<Item = Role>) -> Self {
        let mut set = Self::default();
        for role in roles {
            set.insert(role);
        }
        set
    }

    /// Every role entitled to the portal channel.
    pub fn channel() -> Self {
        Self::of([Role::Backoffice, Role::Operator])
    }

    fn insert(&mut self, role: Role) {
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
    }

    /// Check membership.
    pub fn contains(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    /// Union of two allowed-sets, preserving declaration order.
    pub fn union(&self, other: &AllowedRoles) -> AllowedRoles {
        let mut merged = self.clone();
        for role in &other.roles {
            merged.insert(role.clone());
        }
        merged
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("Backoffice"), Role::Backoffice);
        assert_eq!(Role::parse("BACKOFFICE"), Role::Backoffice);
        assert_eq!(Role::parse("operator"), Role::Operator);
        assert_eq!(Role::parse(" Operator "), Role::Operator);
    }

    #[test]
    fn parse_keeps_unknown_names() {
        assert_eq!(Role::parse("ev_owner"), Role::Other("ev_owner".to_string()));
        assert_eq!(Role::parse("EvOwner").to_string(), "EvOwner");
    }

    #[test]
    fn only_staff_roles_are_channel_allowed() {
        assert!(Role::Backoffice.is_channel_allowed());
        assert!(Role::Operator.is_channel_allowed());
        assert!(!Role::Other("ev_owner".to_string()).is_channel_allowed());
        assert!(!Role::Other(String::new()).is_channel_allowed());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Role::Operator).expect("serialize");
        assert_eq!(json, "\"Operator\"");

        let parsed: Role = serde_json::from_str("\"backoffice\"").expect("deserialize");
        assert_eq!(parsed, Role::Backoffice);
    }

    #[test]
    fn allowed_roles_dedup_and_union() {
        let backoffice = AllowedRoles::of([Role::Backoffice, Role::Backoffice]);
        assert_eq!(backoffice.roles(), &[Role::Backoffice]);

        let operator = AllowedRoles::of([Role::Operator]);
        let both = backoffice.union(&operator);
        assert!(both.contains(&Role::Backoffice));
        assert!(both.contains(&Role::Operator));
        assert_eq!(both, AllowedRoles::channel());
        assert!(!both.contains(&Role::Other("ev_owner".to_string())));
    }

    #[test]
    fn empty_allowed_set_admits_nobody() {
        let none = AllowedRoles::default();
        assert!(none.is_empty());
        assert!(!none.contains(&Role::Backoffice));
    }
}
