//! Bootstrap — first-start checks and root user creation.
//!
//! When factoryflowd starts:
//! 1. Verify the config has a JWT secret and a root password hash —
//!    if not, refuse to start.
//! 2. Ensure the configured root user exists in the users table.

use auth::service::{AuthError, AuthService};
use tracing::info;

use crate::config::ServerConfig;

/// Verify server configuration is ready for use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.root.password_hash.is_empty() {
        anyhow::bail!(
            "No root password hash found in configuration.\n\
             Set [root].password_hash to an argon2id PHC string."
        );
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    Ok(())
}

/// Ensure the root user exists. Creates it from the configured hash if missing.
pub fn ensure_root_user(svc: &AuthService, config: &ServerConfig) -> anyhow::Result<()> {
    match svc.get_user_by_username(&config.root.username) {
        Ok(_) => {
            info!("root user '{}' already exists", config.root.username);
            Ok(())
        }
        Err(AuthError::NotFound(_)) => {
            svc.create_user_with_hash(&config.root.username, &config.root.password_hash)
                .map_err(|e| anyhow::anyhow!("failed to create root user: {e}"))?;
            info!("created root user '{}'", config.root.username);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("root user lookup failed: {e}")),
    }
}
