//! libSQL index of saved cache entries.

use std::path::Path;

use chrono::{DateTime, Utc};
use libsql::{Connection, Database, params};

use oaspages_shared::{OasPagesError, Result};

use crate::migrations;

/// One saved directory blob.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Cache key; also the workdir-relative path that was saved.
    pub key: String,
    /// When the blob was last saved.
    pub cached_at: DateTime<Utc>,
    /// Regular files in the blob.
    pub file_count: u64,
    /// Total size of regular files in bytes.
    pub size_bytes: u64,
    /// SHA-256 over relative paths and file contents.
    pub digest: String,
}

/// Handle to the cache index database.
pub struct CacheIndex {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

fn storage_err(e: libsql::Error) -> OasPagesError {
    OasPagesError::Cache(e.to_string())
}

impl CacheIndex {
    /// Open or create the index at `path` and apply pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| OasPagesError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;
        let conn = db.connect().map_err(storage_err)?;

        let index = Self { db, conn };
        index.run_migrations().await?;
        Ok(index)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying cache index migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        OasPagesError::Cache(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Insert or replace the row for `entry.key`.
    pub async fn upsert_entry(&self, entry: &CacheEntry) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO cache_entries (key, cached_at, file_count, size_bytes, digest)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(key) DO UPDATE SET
                   cached_at = excluded.cached_at,
                   file_count = excluded.file_count,
                   size_bytes = excluded.size_bytes,
                   digest = excluded.digest",
                params![
                    entry.key.as_str(),
                    entry.cached_at.to_rfc3339(),
                    entry.file_count as i64,
                    entry.size_bytes as i64,
                    entry.digest.as_str(),
                ],
            )
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    /// Look up one entry by key.
    pub async fn get_entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        let mut rows = self
            .conn
            .query(
                "SELECT key, cached_at, file_count, size_bytes, digest
                 FROM cache_entries WHERE key = ?1",
                params![key],
            )
            .await
            .map_err(storage_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_entry(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    /// All entries, ordered by key.
    pub async fn list_entries(&self) -> Result<Vec<CacheEntry>> {
        let mut rows = self
            .conn
            .query(
                "SELECT key, cached_at, file_count, size_bytes, digest
                 FROM cache_entries ORDER BY key",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_entry(&row)?);
        }
        Ok(results)
    }

    /// Delete the row for `key`. Returns whether a row existed.
    pub async fn remove_entry(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM cache_entries WHERE key = ?1", params![key])
            .await
            .map_err(storage_err)?;
        Ok(affected > 0)
    }
}

/// Convert a database row to a [`CacheEntry`].
fn row_to_entry(row: &libsql::Row) -> Result<CacheEntry> {
    let cached_at: String = row.get(1).map_err(storage_err)?;
    Ok(CacheEntry {
        key: row.get::<String>(0).map_err(storage_err)?,
        cached_at: DateTime::parse_from_rfc3339(&cached_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| OasPagesError::Cache(format!("invalid date: {e}")))?,
        file_count: row.get::<i64>(2).map_err(storage_err)? as u64,
        size_bytes: row.get::<i64>(3).map_err(storage_err)? as u64,
        digest: row.get::<String>(4).map_err(storage_err)?,
    })
}
