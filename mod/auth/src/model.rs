use serde::{Deserialize, Serialize};

/// A user account that can obtain tokens.
///
/// The password hash never leaves the service layer; `User` is what the
/// store returns and what claims are minted from.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Login name, unique.
    pub username: String,

    /// Argon2id password hash (PHC string).
    pub password_hash: String,

    /// Whether the account may authenticate.
    pub active: bool,

    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// What a token is good for. Encoded in the `token_use` claim so an access
/// token cannot be replayed against the refresh endpoint and a refresh token
/// cannot authenticate a resource request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    /// Login name, for logging and display.
    pub username: String,
    /// Access or refresh.
    pub token_use: TokenUse,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Response body for both token endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Body for `POST /auth/token/`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Body for `POST /auth/token/refresh/`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}
