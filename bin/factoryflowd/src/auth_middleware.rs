//! JWT authentication middleware.
//!
//! Extracts the token from `Authorization: Bearer <token>`, validates it,
//! and provides `Claims` to downstream handlers. Rejections use the same
//! `{"code","message"}` error body as every other endpoint.

use std::sync::Arc;

use auth::model::{Claims, TokenUse};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use factoryflow_core::ServiceError;
use jsonwebtoken::{DecodingKey, Validation};

/// Shared JWT configuration for the middleware.
pub struct JwtState {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtState {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

/// Middleware that requires a valid access token on every non-public path.
///
/// On success the decoded `Claims` are stored in request extensions for
/// handlers that want the caller's identity.
pub async fn auth_middleware(
    State(jwt_state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    if is_public_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthorized("missing authorization token".into()))?;

    let token_data =
        jsonwebtoken::decode::<Claims>(token, &jwt_state.decoding_key, &jwt_state.validation)
            .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {e}")))?;

    // Refresh tokens only work against the refresh endpoint.
    if token_data.claims.token_use != TokenUse::Access {
        return Err(ServiceError::Unauthorized("wrong token type".into()));
    }

    request.extensions_mut().insert(token_data.claims);
    Ok(next.run(request).await)
}

/// Check if a request path is public (no auth required).
fn is_public_path(path: &str) -> bool {
    matches!(path, "/health/" | "/auth/token/" | "/auth/token/refresh/")
}
