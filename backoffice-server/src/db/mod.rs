//! Database Module
//!
//! Embedded SurrealDB (RocksDB on disk, or in memory for tests) and the
//! idempotent schema applied at startup.

pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::core::{Config, ServerError};

const SCHEMA: &str = include_str!("../../schema/backoffice.surql");

/// Database service — owns the SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the configured engine, select ns/db and apply the schema
    pub async fn new(config: &Config) -> Result<Self, ServerError> {
        let db = if config.uses_memory_database() {
            Surreal::new::<Mem>(())
                .await
                .map_err(|e| ServerError::Database(format!("Failed to open in-memory database: {e}")))?
        } else {
            if let Some(parent) = std::path::Path::new(&config.database_path).parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            Surreal::new::<RocksDb>(config.database_path.as_str())
                .await
                .map_err(|e| {
                    ServerError::Database(format!(
                        "Failed to open database at {}: {e}",
                        config.database_path
                    ))
                })?
        };

        db.use_ns(&config.database_namespace)
            .use_db(&config.database_name)
            .await
            .map_err(|e| ServerError::Database(format!("Failed to select namespace: {e}")))?;

        apply_schema(&db).await?;

        tracing::info!(
            path = %config.database_path,
            namespace = %config.database_namespace,
            database = %config.database_name,
            "Database connection established"
        );

        Ok(Self { db })
    }
}

/// Apply table and index definitions
pub async fn apply_schema(db: &Surreal<Db>) -> Result<(), ServerError> {
    db.query(SCHEMA)
        .await
        .and_then(|response| response.check())
        .map_err(|e| ServerError::Database(format!("Failed to apply schema: {e}")))?;
    Ok(())
}
