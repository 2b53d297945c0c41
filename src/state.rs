// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::api::{ApiError, ResourceClient};
use crate::auth::{HttpAuthService, LoginFlow};
use crate::config::PortalConfig;
use crate::error::PortalResult;
use crate::routing::{Navigator, RouteTable};
use crate::session::SessionStore;
use crate::storage::{FileStore, KeyValueStore};

/// Everything a portal front end needs, wired from one configuration.
#[derive(Debug, Clone)]
pub struct PortalState {
    pub config: PortalConfig,
    pub session: SessionStore,
    pub routes: Arc<RouteTable>,
    pub api: ResourceClient,
    pub auth: Arc<HttpAuthService>,
}

impl PortalState {
    /// Build state with the session persisted under `config.session_dir`.
    pub fn from_config(config: PortalConfig) -> PortalResult<Self> {
        let store = FileStore::open(&config.session_dir)?;
        Self::with_store(config, Arc::new(store))
    }

    /// Build state over an explicit key-value backend.
    pub fn with_store(config: PortalConfig, store: Arc<dyn KeyValueStore>) -> PortalResult<Self> {
        let http = config.http_client()?;
        let session = SessionStore::open(store);
        let auth =
            HttpAuthService::new(&config.api_base_url, http.clone()).map_err(ApiError::from)?;
        let api = ResourceClient::new(config.api_base_url.clone(), http, session.clone());

        Ok(Self {
            config,
            session,
            routes: Arc::new(RouteTable::portal()),
            api,
            auth: Arc::new(auth),
        })
    }

    pub fn navigator(&self) -> Navigator {
        Navigator::new(self.routes.clone(), self.session.clone())
    }

    /// Fresh login flow for one login screen.
    pub fn login_flow(&self) -> LoginFlow<Arc<HttpAuthService>> {
        LoginFlow::new(self.auth.clone(), self.session.clone())
    }
}
