pub mod api;
pub mod model;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;
use factoryflow_core::Module;
use factoryflow_sql::SQLStore;

use service::{AuthConfig, AuthService};

/// The Auth module — token issuance and refresh.
///
/// Exposes `POST /auth/token/` and `POST /auth/token/refresh/`. Resource
/// endpoints are gated by the server's JWT middleware, which validates the
/// access tokens this module signs.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    /// Create the auth module and initialise its storage schema.
    pub fn new(
        db: Arc<dyn SQLStore>,
        config: AuthConfig,
    ) -> Result<Self, factoryflow_core::ServiceError> {
        let service = AuthService::new(db, config).map_err(factoryflow_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// The underlying service, for bootstrap (ensuring the root user exists).
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::routes(Arc::clone(&self.service))
    }
}
