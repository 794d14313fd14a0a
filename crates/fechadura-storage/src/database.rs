// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.
//!
//! [`Database::open_encrypted`] opens a SQLCipher database whose 256-bit key
//! is supplied by the caller and never stored in the database itself.

use std::path::Path;

use fechadura_core::FechaduraError;
use tokio_rusqlite::Connection;
use tracing::debug;
use zeroize::Zeroizing;

use crate::migrations;

/// An open, migrated SQLite database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path`, enable WAL, and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, FechaduraError> {
        let conn = connect(path).await?;
        let db = Self::initialize(conn).await?;
        debug!(path, "database opened");
        Ok(db)
    }

    /// Open (creating if needed) the SQLCipher database at `path` under
    /// `key`, then migrate it like [`Database::open`].
    ///
    /// A wrong key, or a plaintext database at `path`, fails here rather than
    /// on the first query.
    pub async fn open_encrypted(path: &str, key: &[u8; 32]) -> Result<Self, FechaduraError> {
        let conn = connect(path).await?;
        let key_hex = Zeroizing::new(hex::encode(key));
        conn.call(move |conn| -> Result<Result<(), FechaduraError>, rusqlite::Error> {
            let pragma = Zeroizing::new(format!("PRAGMA key = \"x'{}'\";", key_hex.as_str()));
            conn.execute_batch(&pragma)?;

            let cipher_version: String =
                conn.query_row("PRAGMA cipher_version;", [], |row| row.get(0))?;
            if cipher_version.trim().is_empty() {
                return Ok(Err(FechaduraError::Storage {
                    source: "SQLCipher is not available in this build".into(),
                }));
            }

            if conn
                .query_row("SELECT count(*) FROM sqlite_master;", [], |row| {
                    row.get::<_, i64>(0)
                })
                .is_err()
            {
                return Ok(Err(FechaduraError::Storage {
                    source: "encryption key verification failed (is the key correct?)".into(),
                }));
            }

            conn.execute_batch("PRAGMA secure_delete = ON;")?;
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)??;

        let db = Self::initialize(conn).await?;
        debug!(path, "encrypted database opened");
        Ok(db)
    }

    /// Open a private in-memory database (tests, dry runs).
    pub async fn open_in_memory() -> Result<Self, FechaduraError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| FechaduraError::Storage {
                source: format!("failed to open in-memory database: {e}").into(),
            })?;
        Self::initialize(conn).await
    }

    async fn initialize(conn: Connection) -> Result<Self, FechaduraError> {
        conn.call(|conn| -> Result<Result<(), FechaduraError>, rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(migrations::run_migrations(conn))
        })
        .await
        .map_err(map_tr_err)??;
        Ok(Self { conn })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL so the main database file is self-contained.
    pub async fn close(&self) -> Result<(), FechaduraError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

async fn connect(path: &str) -> Result<Connection, FechaduraError> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| FechaduraError::Storage {
            source: Box::new(e),
        })?;
    }

    Connection::open(path)
        .await
        .map_err(|e| FechaduraError::Storage {
            source: format!("failed to open {path}: {e}").into(),
        })
}

/// Convert tokio-rusqlite errors to FechaduraError::Storage.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> FechaduraError {
    FechaduraError::Storage {
        source: format!("database error: {e}").into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/dir/fechadura.db");

        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn migrations_create_preferences_table() {
        let db = Database::open_in_memory().await.unwrap();
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'preferences'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("fechadura.db");
        let path = db_path.to_str().unwrap();

        Database::open(path).await.unwrap().close().await.unwrap();
        Database::open(path).await.unwrap();
    }

    #[tokio::test]
    async fn encrypted_database_reopens_with_its_key() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("keystore.db");
        let path = db_path.to_str().unwrap();
        let key = [7u8; 32];

        Database::open_encrypted(path, &key)
            .await
            .unwrap()
            .close()
            .await
            .unwrap();
        Database::open_encrypted(path, &key).await.unwrap();
    }

    #[tokio::test]
    async fn encrypted_database_rejects_wrong_key() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("keystore.db");
        let path = db_path.to_str().unwrap();

        Database::open_encrypted(path, &[7u8; 32])
            .await
            .unwrap()
            .close()
            .await
            .unwrap();

        let err = Database::open_encrypted(path, &[8u8; 32]).await.err().unwrap();
        assert!(err.to_string().contains("key verification failed"));
    }

    #[tokio::test]
    async fn encrypted_database_is_unreadable_without_key() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("keystore.db");
        let path = db_path.to_str().unwrap();

        Database::open_encrypted(path, &[7u8; 32])
            .await
            .unwrap()
            .close()
            .await
            .unwrap();

        assert!(Database::open(path).await.is_err());
        let header = std::fs::read(&db_path).unwrap();
        assert!(!header.starts_with(b"SQLite format 3"));
    }

    #[tokio::test]
    async fn plaintext_database_cannot_be_opened_as_encrypted() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("fechadura.db");
        let path = db_path.to_str().unwrap();

        Database::open(path).await.unwrap().close().await.unwrap();
        assert!(Database::open_encrypted(path, &[7u8; 32]).await.is_err());
    }
}
