// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fechadura reset` command implementation.

use std::sync::Arc;

use fechadura_config::FechaduraConfig;
use fechadura_core::{FechaduraError, KeyValueStore};
use fechadura_vault::SoftwareKeyStore;
use tracing::info;

use crate::stores::Stores;

/// Run the `fechadura reset` command.
pub async fn run_reset(config: &FechaduraConfig) -> Result<(), FechaduraError> {
    let stores = Stores::open(&config.storage).await?;
    let had_record = forget_wrapped_key(
        stores.records.clone(),
        stores.keys.clone(),
        &config.vault.wrapped_key_name,
        &config.vault.wrapping_key_name,
    )
    .await?;
    stores.close().await?;

    if had_record {
        println!("Wrapped key removed. The next unlock will ask for the password.");
    } else {
        println!("No wrapped key stored. Nothing to reset.");
    }
    Ok(())
}

/// Remove the wrapped-key record from `records` and the wrapping key from
/// `keys`. Returns whether a record existed.
pub async fn forget_wrapped_key(
    records: Arc<dyn KeyValueStore>,
    keys: Arc<dyn KeyValueStore>,
    record_name: &str,
    wrapping_key_name: &str,
) -> Result<bool, FechaduraError> {
    let had_record = records.get(record_name).await?.is_some();
    records.remove(record_name).await?;
    SoftwareKeyStore::new(keys)
        .delete_key(wrapping_key_name)
        .await?;
    info!(record = record_name, had_record, "wrapped key forgotten");
    Ok(had_record)
}
