use serde::{Deserialize, Serialize};

use crate::db::Db;
use crate::error::{AppError, Result};

/// User row as stored in the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    /// Unique login key
    pub email: String,
    pub name: String,
    /// Argon2id PHC string, never the plaintext password
    pub password_hash: String,
}

/// User fields safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

impl User {
    /// Insert a new user, returning its id
    ///
    /// Fails with `EmailTaken` if the email is already registered.
    pub async fn create(db: &Db, email: &str, name: &str, password_hash: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO users (email, name, password_hash) VALUES (?, ?, ?)")
            .bind(email)
            .bind(name)
            .bind(password_hash)
            .execute(db)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AppError::EmailTaken
                }
                other => AppError::Database(other),
            })?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_email(db: &Db, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(db: &Db, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, password_hash FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_user_drops_password_hash() {
        let user = User {
            id: 7,
            email: "a@x.com".to_string(),
            name: "A".to_string(),
            password_hash: "$argon2id$secret".to_string(),
        };

        let public = PublicUser::from(user);
        let json = serde_json::to_value(&public).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "a@x.com");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
