// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Staff profile payloads for `/users/me/*`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::auth::FieldError;

pub const MY_PROFILE_PATH: &str = "users/me/profile";
pub const MY_PASSWORD_PATH: &str = "users/me/password";

const MIN_FULL_NAME_LEN: usize = 3;
const MIN_PHONE_LEN: usize = 7;
const MIN_NEW_PASSWORD_LEN: usize = 8;

/// Profile of the signed-in staff member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.full_name.trim().chars().count() < MIN_FULL_NAME_LEN {
            errors.push(FieldError {
                field: "fullName",
                message: "Full name is required".to_string(),
            });
        }
        if !looks_like_email(self.email.trim()) {
            errors.push(FieldError {
                field: "email",
                message: "Enter a valid email".to_string(),
            });
        }
        if self.phone.trim().chars().count() < MIN_PHONE_LEN {
            errors.push(FieldError {
                field: "phone",
                message: "Enter a valid phone".to_string(),
            });
        }
        into_result(errors)
    }
}

impl From<&StaffProfile> for ProfileUpdate {
    fn from(profile: &StaffProfile) -> Self {
        Self {
            full_name: profile.full_name.clone().unwrap_or_default(),
            email: profile.email.clone().unwrap_or_default(),
            phone: profile.phone.clone().unwrap_or_default(),
        }
    }
}

/// Password change request.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl PasswordChange {
    pub fn new(current: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            current_password: current.into(),
            new_password: new.into(),
        }
    }

    /// `confirmation` must repeat the new password.
    pub fn validate(&self, confirmation: &str) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.current_password.is_empty() {
            errors.push(FieldError {
                field: "currentPassword",
                message: "Current password is required".to_string(),
            });
        }
        if self.new_password.chars().count() < MIN_NEW_PASSWORD_LEN {
            errors.push(FieldError {
                field: "newPassword",
                message: format!("Minimum {MIN_NEW_PASSWORD_LEN} characters"),
            });
        }
        if self.new_password != confirmation {
            errors.push(FieldError {
                field: "confirmNewPassword",
                message: "Passwords do not match".to_string(),
            });
        }
        into_result(errors)
    }
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChange").finish_non_exhaustive()
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn into_result(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
