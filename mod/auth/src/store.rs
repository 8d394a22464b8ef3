use std::sync::Arc;

use factoryflow_sql::{Row, SQLStore, Value};

use crate::model::User;
use crate::service::AuthError;

/// SQL schema for the users table.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    active        INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL
);
";

/// Persistent storage for user accounts, backed by SQLStore (SQLite).
pub struct UserStore {
    db: Arc<dyn SQLStore>,
}

impl UserStore {
    /// Create a new UserStore and initialise the schema.
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, AuthError> {
        db.exec_batch(SCHEMA)
            .map_err(|e| AuthError::Storage(format!("users schema init: {e}")))?;
        Ok(Self { db })
    }

    /// Insert a new user. Duplicate usernames are a conflict.
    pub fn create(&self, user: &User) -> Result<(), AuthError> {
        self.db
            .exec(
                "INSERT INTO users (id, username, password_hash, active, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(user.id.clone()),
                    Value::Text(user.username.clone()),
                    Value::Text(user.password_hash.clone()),
                    Value::Integer(user.active as i64),
                    Value::Text(user.created_at.clone()),
                ],
            )
            .map_err(|e| {
                if e.is_constraint() {
                    AuthError::Conflict(format!("username '{}' already exists", user.username))
                } else {
                    AuthError::Storage(e.to_string())
                }
            })?;
        Ok(())
    }

    /// Get a user by ID.
    pub fn get(&self, id: &str) -> Result<User, AuthError> {
        let rows = self
            .db
            .query(
                "SELECT id, username, password_hash, active, created_at \
                 FROM users WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| AuthError::NotFound(format!("user {id}")))?;
        row_to_user(row)
    }

    /// Get a user by login name.
    pub fn get_by_username(&self, username: &str) -> Result<User, AuthError> {
        let rows = self
            .db
            .query(
                "SELECT id, username, password_hash, active, created_at \
                 FROM users WHERE username = ?1",
                &[Value::Text(username.to_string())],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| AuthError::NotFound(format!("user '{username}'")))?;
        row_to_user(row)
    }
}

fn row_to_user(row: &Row) -> Result<User, AuthError> {
    let field = |name: &str| {
        row.get_str(name)
            .map(String::from)
            .ok_or_else(|| AuthError::Storage(format!("missing column {name}")))
    };
    Ok(User {
        id: field("id")?,
        username: field("username")?,
        password_hash: field("password_hash")?,
        active: row.get_i64("active").unwrap_or(0) != 0,
        created_at: field("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use factoryflow_core::{new_id, now_rfc3339};
    use factoryflow_sql::SqliteStore;

    fn test_store() -> UserStore {
        let db = Arc::new(SqliteStore::open_in_memory().unwrap());
        UserStore::new(db).unwrap()
    }

    fn make_user(username: &str) -> User {
        User {
            id: new_id(),
            username: username.into(),
            password_hash: "$argon2id$fake".into(),
            active: true,
            created_at: now_rfc3339(),
        }
    }

    #[test]
    fn create_and_lookup() {
        let store = test_store();
        let user = make_user("alice");
        store.create(&user).unwrap();

        let got = store.get(&user.id).unwrap();
        assert_eq!(got.username, "alice");
        assert!(got.active);

        let got = store.get_by_username("alice").unwrap();
        assert_eq!(got.id, user.id);
    }

    #[test]
    fn duplicate_username_is_conflict() {
        let store = test_store();
        store.create(&make_user("alice")).unwrap();
        let err = store.create(&make_user("alice")).unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
    }

    #[test]
    fn unknown_user_not_found() {
        let store = test_store();
        assert!(matches!(store.get("nope"), Err(AuthError::NotFound(_))));
        assert!(matches!(
            store.get_by_username("nope"),
            Err(AuthError::NotFound(_))
        ));
    }
}
