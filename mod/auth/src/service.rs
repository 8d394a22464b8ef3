use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use factoryflow_core::{new_id, now_rfc3339};
use factoryflow_sql::SQLStore;

use crate::model::{Claims, TokenPair, TokenUse, User};
use crate::store::UserStore;

/// Auth service error type.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    Internal(String),
}

impl From<AuthError> for factoryflow_core::ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::NotFound(m) => factoryflow_core::ServiceError::NotFound(m),
            AuthError::Conflict(m) => factoryflow_core::ServiceError::Conflict(m),
            AuthError::Validation(m) => factoryflow_core::ServiceError::Validation(m),
            AuthError::Unauthorized(m) => factoryflow_core::ServiceError::Unauthorized(m),
            AuthError::Storage(m) => factoryflow_core::ServiceError::Storage(m),
            AuthError::Internal(m) => factoryflow_core::ServiceError::Internal(m),
        }
    }
}

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret (HS256).
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 60 minutes).
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds (default: 1 day).
    pub refresh_token_ttl: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "factoryflow-dev-secret-change-me".to_string(),
            access_token_ttl: 3600,
            refresh_token_ttl: 86400,
        }
    }
}

/// The Auth service. Holds the user store and token configuration.
pub struct AuthService {
    store: UserStore,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new AuthService, initialising the DB schema.
    pub fn new(db: Arc<dyn SQLStore>, config: AuthConfig) -> Result<Arc<Self>, AuthError> {
        let store = UserStore::new(db)?;
        Ok(Arc::new(Self { store, config }))
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    // ── Users ───────────────────────────────────────────────────────

    /// Create a user with an argon2id-hashed password.
    pub fn create_user(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::Validation("username: must not be empty".into()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("password: must not be empty".into()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("password hash failed: {e}")))?
            .to_string();

        let user = User {
            id: new_id(),
            username: username.to_string(),
            password_hash: hash,
            active: true,
            created_at: now_rfc3339(),
        };
        self.store.create(&user)?;
        Ok(user)
    }

    /// Create a user from a pre-computed argon2id PHC hash (bootstrap path —
    /// the config carries a hash, never a plaintext password).
    pub fn create_user_with_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, AuthError> {
        let user = User {
            id: new_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            active: true,
            created_at: now_rfc3339(),
        };
        self.store.create(&user)?;
        Ok(user)
    }

    /// Look up a user by login name.
    pub fn get_user_by_username(&self, username: &str) -> Result<User, AuthError> {
        self.store.get_by_username(username)
    }

    /// Verify a username/password pair.
    ///
    /// Unknown user, wrong password and deactivated account all collapse to
    /// the same "invalid credentials" error — callers learn nothing about
    /// which users exist.
    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let invalid = || AuthError::Unauthorized("invalid credentials".into());

        let user = self.store.get_by_username(username).map_err(|_| invalid())?;
        if !user.active {
            return Err(invalid());
        }

        let parsed = PasswordHash::new(&user.password_hash).map_err(|_| invalid())?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| invalid())?;

        Ok(user)
    }

    // ── Tokens ──────────────────────────────────────────────────────

    /// Issue a JWT token pair (access + refresh) for a user.
    pub fn issue_tokens(&self, user: &User) -> Result<TokenPair, AuthError> {
        let now = chrono::Utc::now();
        let access_exp = now + chrono::Duration::seconds(self.config.access_token_ttl);
        let refresh_exp = now + chrono::Duration::seconds(self.config.refresh_token_ttl);

        let access_claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            token_use: TokenUse::Access,
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
        };
        let refresh_claims = Claims {
            token_use: TokenUse::Refresh,
            exp: refresh_exp.timestamp(),
            ..access_claims.clone()
        };

        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let access_token = encode(&Header::default(), &access_claims, &key)
            .map_err(|e| AuthError::Internal(format!("JWT encode failed: {e}")))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &key)
            .map_err(|e| AuthError::Internal(format!("JWT encode failed: {e}")))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl,
        })
    }

    /// Verify and decode a JWT, requiring the given token use.
    pub fn verify_token(&self, token: &str, expected: TokenUse) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AuthError::Unauthorized(format!("invalid token: {e}")))?;

        let claims = token_data.claims;
        if claims.token_use != expected {
            return Err(AuthError::Unauthorized("wrong token type".into()));
        }
        Ok(claims)
    }

    /// Refresh: validate a refresh token and issue a new pair.
    ///
    /// The user must still exist and be active — deactivation cuts off
    /// refresh even before the refresh token expires.
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.verify_token(refresh_token, TokenUse::Refresh)?;

        let user = self
            .store
            .get(&claims.sub)
            .map_err(|_| AuthError::Unauthorized("user not found".into()))?;
        if !user.active {
            return Err(AuthError::Unauthorized("user is deactivated".into()));
        }

        self.issue_tokens(&user)
    }
}
