//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.
//!
//! Every entity family shares one generic [`EntityRepository`], driven by the
//! [`Entity`] descriptor implemented in the per-family modules. Sessions have
//! their own repository.

pub mod entity;

// Accounts
pub mod admin;
pub mod role;
pub mod session;
pub mod user;

// Catalog
pub mod category;
pub mod product;

pub use entity::{Document, Entity, Reference, ReferencedBy};
pub use session::{SessionRecord, SessionRepository};

use std::marker::PhantomData;
use std::time::Duration;

use rand::Rng;

use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Optimistic transaction lost a read/write race and may be re-run
    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        Self::classify(err.to_string())
    }
}

impl RepoError {
    fn classify(message: String) -> Self {
        // Unique index violation: "Database index `user_email` already contains ..."
        if message.contains("already contains") {
            RepoError::Duplicate(message)
        } else if message.contains("can be retried") || message.contains("read or write conflict") {
            RepoError::Conflict(message)
        } else {
            RepoError::Database(message)
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Serialization(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Conflict(msg) | RepoError::Database(msg) => AppError::database(msg),
            RepoError::Serialization(msg) => AppError::internal(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention
// =============================================================================
//
// Records are keyed by 24-hex object ids (shared::util::object_id) and the
// API only ever sees the bare key:
//   - 创建: RecordId::from_table_key("product", id)
//   - 读取: SELECT *, meta::id(id) AS id FROM $rid
//   - 写入: CREATE $rid CONTENT $data / UPDATE $rid MERGE $data
//
// Keys are always bound as RecordId parameters, never formatted into SQL.

/// Build a record id for a table and bare key
pub fn record_id(table: &str, id: &str) -> RecordId {
    RecordId::from_table_key(table, id.to_string())
}

/// Whether a record with the given key exists in `table`
pub async fn record_exists(db: &Surreal<Db>, table: &str, id: &str) -> RepoResult<bool> {
    if !shared::util::is_object_id(id) {
        return Ok(false);
    }
    let mut result = db
        .query("SELECT VALUE meta::id(id) FROM $rid")
        .bind(("rid", record_id(table, id)))
        .await?;
    let found: Vec<String> = result.take(0)?;
    Ok(!found.is_empty())
}

/// Number of records in `table` whose `field` holds `id`
///
/// `field` is a descriptor constant, never user input.
pub async fn count_referencing(
    db: &Surreal<Db>,
    table: &str,
    field: &'static str,
    id: &str,
) -> RepoResult<i64> {
    let mut result = db
        .query(format!(
            "SELECT count() FROM type::table($tb) WHERE {field} = $id GROUP ALL"
        ))
        .bind(("tb", table.to_string()))
        .bind(("id", id.to_string()))
        .await?;
    let count: Option<i64> = result.take((0, "count"))?;
    Ok(count.unwrap_or(0))
}

/// 写冲突重试上限 (整个事务重跑)
const MAX_WRITE_ATTEMPTS: u32 = 12;
const RETRY_BASE_DELAY_MS: u64 = 2;
const RETRY_MAX_DELAY_MS: u64 = 100;

/// Backoff before re-running a conflicted write: base * 2^attempt, capped, plus jitter
fn retry_delay(attempt: u32) -> Duration {
    let ceiling = (RETRY_BASE_DELAY_MS * 2u64.pow(attempt.min(16))).min(RETRY_MAX_DELAY_MS);
    let jitter = rand::thread_rng().gen_range(0..=ceiling);
    Duration::from_millis(ceiling / 2 + jitter / 2)
}

/// Generic repository for one entity family
pub struct EntityRepository<E> {
    db: Surreal<Db>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityRepository<E> {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    pub async fn find_all(&self) -> RepoResult<Vec<E>> {
        let mut result = self
            .db
            .query("SELECT *, meta::id(id) AS id FROM type::table($tb) ORDER BY id")
            .bind(("tb", E::TABLE))
            .await?;
        let records: Vec<E> = result.take(0)?;
        Ok(records)
    }

    /// Look up a record; malformed ids simply resolve to `None`
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<E>> {
        if !shared::util::is_object_id(id) {
            return Ok(None);
        }
        let mut result = self
            .db
            .query("SELECT *, meta::id(id) AS id FROM $rid")
            .bind(("rid", record_id(E::TABLE, id)))
            .await?;
        let records: Vec<E> = result.take(0)?;
        Ok(records.into_iter().next())
    }

    /// Batch lookup used to populate references
    pub async fn find_many(&self, ids: &[String]) -> RepoResult<Vec<E>> {
        let things: Vec<RecordId> = ids
            .iter()
            .filter(|id| shared::util::is_object_id(id))
            .map(|id| record_id(E::TABLE, id))
            .collect();
        if things.is_empty() {
            return Ok(Vec::new());
        }
        let mut result = self
            .db
            .query("SELECT *, meta::id(id) AS id FROM $things")
            .bind(("things", things))
            .await?;
        let records: Vec<E> = result.take(0)?;
        Ok(records)
    }

    /// First record sharing any unique key value with `fields`
    ///
    /// Keys absent from `fields` are not compared. `exclude` skips the record
    /// being updated.
    pub async fn find_conflict(&self, fields: &Document, exclude: Option<&str>) -> RepoResult<Option<E>> {
        let present: Vec<(&str, Value)> = E::UNIQUE_KEYS
            .iter()
            .filter_map(|key| fields.get(*key).map(|v| (*key, v.clone())))
            .collect();
        if present.is_empty() {
            return Ok(None);
        }

        let condition = present
            .iter()
            .enumerate()
            .map(|(i, (key, _))| format!("{key} = $v{i}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let mut sql = format!("SELECT *, meta::id(id) AS id FROM type::table($tb) WHERE ({condition})");
        if exclude.is_some() {
            sql.push_str(" AND id != $exclude");
        }
        sql.push_str(" LIMIT 1");

        let mut query = self.db.query(sql).bind(("tb", E::TABLE));
        for (i, (_, value)) in present.into_iter().enumerate() {
            query = query.bind((format!("v{i}"), value));
        }
        if let Some(id) = exclude {
            query = query.bind(("exclude", record_id(E::TABLE, id)));
        }

        let mut result = query.await?;
        let records: Vec<E> = result.take(0)?;
        Ok(records.into_iter().next())
    }

    /// Create a record; counted references are incremented in the same transaction
    pub async fn insert(&self, id: &str, data: Document) -> RepoResult<()> {
        let mut sql = String::from("CREATE $rid CONTENT $data RETURN NONE;\n");
        for (table, field, counter) in counted_references::<E>() {
            sql.push_str(&format!(
                "IF $data.{field} != NONE {{ UPDATE type::thing('{table}', $data.{field}) SET {counter} += 1 RETURN NONE; }};\n"
            ));
        }
        self.write(&sql, id, Some(data)).await
    }

    /// Merge a partial document into a record
    ///
    /// A counted reference that changes moves one unit from the old target to
    /// the new one. The old value is read inside the transaction, so a re-run
    /// after a conflict sees the winner's write.
    pub async fn merge(&self, id: &str, patch: Document) -> RepoResult<()> {
        let mut sql = String::from("LET $before = (SELECT * FROM ONLY $rid);\n");
        sql.push_str("IF $before != NONE { UPDATE $rid MERGE $data RETURN NONE; };\n");
        for (table, field, counter) in counted_references::<E>() {
            sql.push_str(&format!(
                "LET $moved = ($before != NONE) AND ($data.{field} != NONE) AND ($data.{field} != $before.{field});\n"
            ));
            sql.push_str(&format!(
                "IF $moved AND ($before.{field} != NONE) {{ UPDATE type::thing('{table}', $before.{field}) SET {counter} -= 1 RETURN NONE; }};\n"
            ));
            sql.push_str(&format!(
                "IF $moved {{ UPDATE type::thing('{table}', $data.{field}) SET {counter} += 1 RETURN NONE; }};\n"
            ));
        }
        self.write(&sql, id, Some(patch)).await
    }

    /// Delete a record; counted references are decremented only if it still existed
    pub async fn remove(&self, id: &str) -> RepoResult<()> {
        let mut sql = String::from("LET $before = (SELECT * FROM ONLY $rid);\n");
        sql.push_str("DELETE $rid RETURN NONE;\n");
        for (table, field, counter) in counted_references::<E>() {
            sql.push_str(&format!(
                "IF ($before != NONE) AND ($before.{field} != NONE) {{ UPDATE type::thing('{table}', $before.{field}) SET {counter} -= 1 RETURN NONE; }};\n"
            ));
        }
        self.write(&sql, id, None).await
    }

    /// Run `statements` as one transaction
    ///
    /// A transaction that loses a commit race leaves nothing behind, so it is
    /// re-run as a whole until it lands or the attempts run out.
    async fn write(&self, statements: &str, id: &str, data: Option<Document>) -> RepoResult<()> {
        let sql = format!("BEGIN TRANSACTION;\n{statements}COMMIT TRANSACTION;");
        let data = data.map(Value::Object);

        let mut attempt = 0;
        loop {
            match self.write_once(&sql, id, data.clone()).await {
                Err(RepoError::Conflict(message)) if attempt + 1 < MAX_WRITE_ATTEMPTS => {
                    tracing::debug!(table = E::TABLE, id, attempt, "Write conflict, retrying: {message}");
                    tokio::time::sleep(retry_delay(attempt)).await;
                    attempt += 1;
                }
                Err(RepoError::Conflict(message)) => {
                    tracing::warn!(table = E::TABLE, id, attempts = MAX_WRITE_ATTEMPTS, "Write conflict persisted");
                    return Err(RepoError::Conflict(message));
                }
                other => return other,
            }
        }
    }

    async fn write_once(&self, sql: &str, id: &str, data: Option<Value>) -> RepoResult<()> {
        let mut query = self.db.query(sql).bind(("rid", record_id(E::TABLE, id)));
        if let Some(data) = data {
            query = query.bind(("data", data));
        }
        query.await?.check()?;
        Ok(())
    }
}

/// `(target table, reference field, counter field)` for each counted reference
///
/// All three are descriptor constants, never user input.
fn counted_references<E: Entity>() -> impl Iterator<Item = (&'static str, &'static str, &'static str)> {
    E::REFERENCES
        .iter()
        .filter_map(|r| Some((r.table, r.field, r.counter?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_conflicts_are_retryable() {
        let err = RepoError::classify(
            "The query was not executed due to a failed transaction. Failed to commit transaction \
             due to a read or write conflict. This transaction can be retried"
                .into(),
        );
        assert!(matches!(err, RepoError::Conflict(_)));
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::DatabaseError);

        let err = RepoError::classify("Database index `category_name` already contains 'Drinks'".into());
        assert!(matches!(err, RepoError::Duplicate(_)));
        assert!(matches!(RepoError::classify("Parse error".into()), RepoError::Database(_)));
    }

    #[test]
    fn retry_delay_is_capped() {
        for attempt in 0..MAX_WRITE_ATTEMPTS {
            let delay = retry_delay(attempt);
            assert!(delay <= Duration::from_millis(RETRY_MAX_DELAY_MS));
        }
        assert!(retry_delay(0) <= Duration::from_millis(RETRY_BASE_DELAY_MS));
    }
}
