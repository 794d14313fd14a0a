// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The two databases behind every command.
//!
//! The wrapped-key record lives in the plain record database. The wrapping
//! key lives in a separate SQLCipher database whose key is read from its own
//! file, so neither database file alone yields the derived key.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;

use fechadura_config::model::StorageConfig;
use fechadura_core::FechaduraError;
use fechadura_storage::SqliteStore;
use fechadura_vault::SoftwareKeyStore;
use tracing::info;
use zeroize::Zeroizing;

/// Record database and key store database, opened together.
pub struct Stores {
    pub records: Arc<SqliteStore>,
    pub keys: Arc<SqliteStore>,
}

impl Stores {
    pub async fn open(storage: &StorageConfig) -> Result<Self, FechaduraError> {
        let key = key_store_key(storage)?;
        let keys = Arc::new(SqliteStore::open_encrypted(&storage.keystore_path, &key).await?);
        let records = Arc::new(SqliteStore::open(&storage.database_path).await?);
        Ok(Self { records, keys })
    }

    /// Software key provider over the key store database.
    pub fn keystore(&self) -> SoftwareKeyStore {
        SoftwareKeyStore::new(self.keys.clone())
    }

    pub async fn close(&self) -> Result<(), FechaduraError> {
        self.records.close().await?;
        self.keys.close().await
    }
}

/// Read the key store key, creating it on first use. A missing key file next
/// to an existing key store is an error: a fresh key could never open it.
fn key_store_key(storage: &StorageConfig) -> Result<Zeroizing<[u8; 32]>, FechaduraError> {
    let key_path = Path::new(&storage.keystore_key_path);
    match read_key_file(key_path)? {
        Some(key) => Ok(key),
        None if Path::new(&storage.keystore_path).exists() => {
            Err(FechaduraError::KeyStore(format!(
                "key file {} is missing but key store {} exists; delete the key store \
                 and run `fechadura reset` to start over",
                key_path.display(),
                storage.keystore_path
            )))
        }
        None => create_key_file(key_path),
    }
}

fn read_key_file(path: &Path) -> Result<Option<Zeroizing<[u8; 32]>>, FechaduraError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => Zeroizing::new(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(FechaduraError::KeyStore(format!(
                "cannot read key file {}: {e}",
                path.display()
            )));
        }
    };

    let mut key = Zeroizing::new([0u8; 32]);
    hex::decode_to_slice(contents.trim(), &mut key[..]).map_err(|e| {
        FechaduraError::KeyStore(format!(
            "key file {} does not hold a 32-byte hex key: {e}",
            path.display()
        ))
    })?;
    Ok(Some(key))
}

fn create_key_file(path: &Path) -> Result<Zeroizing<[u8; 32]>, FechaduraError> {
    let io_err = |e: std::io::Error| {
        FechaduraError::KeyStore(format!("cannot create key file {}: {e}", path.display()))
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let key = fechadura_vault::crypto::generate_random_key()?;
    let encoded = Zeroizing::new(hex::encode(key.as_slice()));

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(io_err)?;
    file.write_all(encoded.as_bytes()).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;

    info!(path = %path.display(), "key store key created");
    Ok(key)
}
