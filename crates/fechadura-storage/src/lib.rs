// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Fechadura lock client.
//!
//! Provides a WAL-mode SQLite database with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and a preferences-style
//! [`KeyValueStore`](fechadura_core::KeyValueStore). The same store type backs
//! the wrapped-key record in a plain database and the software key store's
//! keys in a separate SQLCipher database.

pub mod database;
pub mod migrations;
pub mod store;

pub use database::Database;
pub use store::SqliteStore;
