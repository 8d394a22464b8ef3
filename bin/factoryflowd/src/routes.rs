//! Route registration — module routes + the public health endpoint.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Router};

use crate::auth_middleware::{self, JwtState};

/// Service name reported by the health endpoint.
const SERVICE_NAME: &str = "factoryflow-lite";

/// Build the complete router.
///
/// Module routers already carry their full public paths; they are merged,
/// not nested. The JWT middleware wraps everything — public paths are
/// exempted inside the middleware itself.
pub fn build_router(jwt_state: Arc<JwtState>, module_routes: Vec<(&str, Router)>) -> Router {
    let mut app = Router::new().route("/health/", get(health));

    for (name, router) in module_routes {
        tracing::debug!("mounting routes for module {name}");
        app = app.merge(router);
    }

    app.layer(middleware::from_fn_with_state(
        jwt_state,
        auth_middleware::auth_middleware,
    ))
}

/// Liveness probe. Deliberately touches nothing — it must keep answering
/// when the data store is unreachable.
async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
