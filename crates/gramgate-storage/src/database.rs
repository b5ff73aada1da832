// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional write connections for the same file.

use std::time::Duration;

use gramgate_core::GramgateError;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database.
///
/// Cloning is cheap; every clone shares the same background connection.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs and run all
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, GramgateError> {
        // Migrations run on a short-lived blocking connection so refinery
        // sees a plain `rusqlite::Connection`.
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), GramgateError> {
            let mut conn =
                rusqlite::Connection::open(&migrate_path).map_err(GramgateError::storage)?;
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(GramgateError::storage)?;
            conn.pragma_update(None, "foreign_keys", "ON")
                .map_err(GramgateError::storage)?;
            migrations::run_migrations(&mut conn)?;
            Ok(())
        })
        .await
        .map_err(|e| GramgateError::Internal(format!("migration task panicked: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(GramgateError::storage)?;

        conn.call(|c| {
            c.busy_timeout(Duration::from_secs(5))?;
            c.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the database, flushing pending writes.
    pub async fn close(self) -> Result<(), GramgateError> {
        self.conn
            .close()
            .await
            .map_err(|e| GramgateError::Storage {
                source: Box::new(e),
            })
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> GramgateError {
    GramgateError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                let mut names = Vec::new();
                for row in rows {
                    names.push(row?);
                }
                Ok::<_, rusqlite::Error>(names)
            })
            .await
            .unwrap();

        assert!(tables.iter().any(|t| t == "connections"));
        assert!(tables.iter().any(|t| t == "bots"));
        assert!(tables.iter().any(|t| t == "tg_users"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();

        // Migrations must not re-apply on a second open.
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }
}
