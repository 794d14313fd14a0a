// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted string key-value store (preferences-style).

use async_trait::async_trait;

use crate::error::FechaduraError;

/// Simple string key-value persistence used for the wrapped-key record.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when absent.
    async fn get(&self, name: &str) -> Result<Option<String>, FechaduraError>;

    /// Insert or overwrite a value.
    async fn put(&self, name: &str, value: &str) -> Result<(), FechaduraError>;

    /// Delete a value. Removing an absent name is not an error.
    async fn remove(&self, name: &str) -> Result<(), FechaduraError>;
}
