use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use factoryflow_core::ServiceError;

use crate::model::{RefreshRequest, TokenPair, TokenRequest};
use crate::service::AuthService;

type AppState = Arc<AuthService>;

/// Token endpoints. Both are public — the server's auth middleware
/// lists them as exempt paths.
pub fn routes(svc: Arc<AuthService>) -> Router {
    Router::new()
        .route("/auth/token/", post(obtain_token))
        .route("/auth/token/refresh/", post(refresh_token))
        .with_state(svc)
}

/// POST /auth/token/ — credentials in, token pair out.
async fn obtain_token(
    State(svc): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenPair>, ServiceError> {
    let user = svc
        .verify_credentials(&req.username, &req.password)
        .map_err(ServiceError::from)?;
    let pair = svc.issue_tokens(&user).map_err(ServiceError::from)?;
    Ok(Json(pair))
}

/// POST /auth/token/refresh/ — refresh token in, new pair out.
async fn refresh_token(
    State(svc): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ServiceError> {
    let pair = svc
        .refresh_tokens(&req.refresh_token)
        .map_err(ServiceError::from)?;
    Ok(Json(pair))
}
