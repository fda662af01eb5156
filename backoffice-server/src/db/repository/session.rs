//! Session Repository
//!
//! Server-side admin sessions. Records are keyed by the SHA-256 digest of the
//! cookie token, so the raw token never reaches storage.

use serde::{Deserialize, Serialize};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::RepoResult;

pub const TABLE: &str = "session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Token digest (hex)
    pub id: String,
    pub admin_id: String,
    /// Unix millis after which the session is dead
    pub expires_at: i64,
}

#[derive(Clone)]
pub struct SessionRepository {
    db: Surreal<Db>,
}

impl SessionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    fn thing(digest: &str) -> RecordId {
        RecordId::from_table_key(TABLE, digest.to_string())
    }

    pub async fn create(&self, digest: &str, admin_id: &str, expires_at: i64) -> RepoResult<()> {
        self.db
            .query("CREATE $rid SET admin_id = $admin, expires_at = $expires RETURN NONE")
            .bind(("rid", Self::thing(digest)))
            .bind(("admin", admin_id.to_string()))
            .bind(("expires", expires_at))
            .await?
            .check()?;
        Ok(())
    }

    /// Session that has not expired at `now`
    pub async fn find_live(&self, digest: &str, now: i64) -> RepoResult<Option<SessionRecord>> {
        let mut result = self
            .db
            .query("SELECT *, meta::id(id) AS id FROM $rid WHERE expires_at > $now")
            .bind(("rid", Self::thing(digest)))
            .bind(("now", now))
            .await?;
        let sessions: Vec<SessionRecord> = result.take(0)?;
        Ok(sessions.into_iter().next())
    }

    /// Slide the expiry forward
    pub async fn touch(&self, digest: &str, expires_at: i64) -> RepoResult<()> {
        self.db
            .query("UPDATE $rid SET expires_at = $expires RETURN NONE")
            .bind(("rid", Self::thing(digest)))
            .bind(("expires", expires_at))
            .await?
            .check()?;
        Ok(())
    }

    pub async fn delete(&self, digest: &str) -> RepoResult<()> {
        self.db
            .query("DELETE $rid RETURN NONE")
            .bind(("rid", Self::thing(digest)))
            .await?
            .check()?;
        Ok(())
    }

    /// Remove every session of one admin, returning how many were removed
    pub async fn delete_for_admin(&self, admin_id: &str) -> RepoResult<i64> {
        let mut result = self
            .db
            .query(
                "SELECT count() FROM session WHERE admin_id = $admin GROUP ALL; \
                 DELETE session WHERE admin_id = $admin RETURN NONE;",
            )
            .bind(("admin", admin_id.to_string()))
            .await?
            .check()?;
        let removed: Option<i64> = result.take((0, "count"))?;
        Ok(removed.unwrap_or(0))
    }

    /// Remove sessions expired at `now`
    pub async fn purge_expired(&self, now: i64) -> RepoResult<i64> {
        let mut result = self
            .db
            .query(
                "SELECT count() FROM session WHERE expires_at <= $now GROUP ALL; \
                 DELETE session WHERE expires_at <= $now RETURN NONE;",
            )
            .bind(("now", now))
            .await?
            .check()?;
        let removed: Option<i64> = result.take((0, "count"))?;
        Ok(removed.unwrap_or(0))
    }
}
