// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::api::ApiError;
use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::routing::NavigationError;
use crate::storage::StorageError;

/// Any failure surfaced by the portal client.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

impl PortalError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PortalError::Auth(e) => e.error_code(),
            PortalError::Api(e) => e.error_code(),
            PortalError::Storage(_) => "storage_error",
            PortalError::Config(_) => "config_error",
            PortalError::Navigation(_) => "redirect_loop",
        }
    }
}

pub type PortalResult<T> = Result<T, PortalError>;
