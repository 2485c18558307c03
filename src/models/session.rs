use crate::db::Db;
use crate::error::Result;

/// Server-side session row: token -> user id, valid until `expires_at`
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: i64,
    /// Unix timestamp after which the session is dead
    pub expires_at: i64,
}

impl SessionRecord {
    /// Create a new session record expiring `ttl_secs` after `now`
    pub fn new(token: String, user_id: i64, now: i64, ttl_secs: i64) -> Self {
        Self {
            token,
            user_id,
            expires_at: now.saturating_add(ttl_secs),
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Persist this session, purging any expired rows first
    pub async fn insert(&self, db: &Db, now: i64) -> Result<()> {
        let purged = purge_expired(db, now).await?;
        if purged > 0 {
            tracing::debug!("Purged {} expired sessions", purged);
        }

        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&self.token)
            .bind(self.user_id)
            .bind(self.expires_at)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Look up a live session by token
    ///
    /// An expired row is deleted and reported as absent.
    pub async fn find_active(db: &Db, token: &str, now: i64) -> Result<Option<SessionRecord>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT token, user_id, expires_at FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(db)
        .await?;

        match record {
            Some(record) if record.is_expired(now) => {
                Self::delete(db, token).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    pub async fn delete(db: &Db, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(db)
            .await?;
        Ok(())
    }
}

/// Delete every session that expired at or before `now`
pub async fn purge_expired(db: &Db, now: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
