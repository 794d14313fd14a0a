// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the KeyValueStore trait.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use fechadura_core::{FechaduraError, KeyValueStore};

use crate::database::{map_tr_err, Database};

/// Preferences-style string store over the `preferences` table.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database at `path` and wrap it.
    pub async fn open(path: &str) -> Result<Self, FechaduraError> {
        Ok(Self::new(Database::open(path).await?))
    }

    /// Open the SQLCipher database at `path` under `key` and wrap it.
    pub async fn open_encrypted(path: &str, key: &[u8; 32]) -> Result<Self, FechaduraError> {
        Ok(Self::new(Database::open_encrypted(path, key).await?))
    }

    /// All stored names, sorted.
    pub async fn names(&self) -> Result<Vec<String>, FechaduraError> {
        self.db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT name FROM preferences ORDER BY name")?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
    }

    pub async fn close(&self) -> Result<(), FechaduraError> {
        self.db.close().await
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, name: &str) -> Result<Option<String>, FechaduraError> {
        let name = name.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM preferences WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn put(&self, name: &str, value: &str) -> Result<(), FechaduraError> {
        let name = name.to_string();
        let value = value.to_string();
        let now = Utc::now().to_rfc3339();
        let logged_name = name.clone();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO preferences (name, value, updated_at) VALUES (?1, ?2, ?3) \
                     ON CONFLICT(name) DO UPDATE SET value = excluded.value, \
                     updated_at = excluded.updated_at",
                    params![name, value, now],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(name = %logged_name, "preference stored");
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), FechaduraError> {
        let name = name.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM preferences WHERE name = ?1", params![name])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
