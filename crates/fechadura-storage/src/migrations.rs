// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL migration files are compiled into the binary at build time via
//! `embed_migrations!`. Migrations run automatically on database open.

use fechadura_core::FechaduraError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history` table.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), FechaduraError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| FechaduraError::Storage {
            source: Box::new(e),
        })?;
    for migration in report.applied_migrations() {
        tracing::debug!(migration = %migration, "applied migration");
    }
    Ok(())
}
