// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Software secure-key provider backed by a [`KeyValueStore`].
//!
//! Keys are generated with the system CSPRNG and stored under
//! `keystore.<name>`; their bytes only ever leave the store inside a
//! [`SoftwareCipher`]. Keys created with `user_authentication_required`
//! refuse to finalize a cipher unless the paired [`PresenceGate`] granted it.
//! A grant covers exactly one `do_final`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fechadura_core::{
    BiometricGate, Capability, CipherHandle, CipherMode, FechaduraError, GrantId, IV_LEN,
    KeyAlias, KeySpec, KeyValueStore, PromptInfo, SecureKeyProvider,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto;

/// Name prefix for key records in the backing store.
pub const KEY_PREFIX: &str = "keystore.";

/// Persisted form of a software key.
#[derive(Serialize, Deserialize)]
struct StoredKey {
    key: String,
    auth_required: bool,
}

/// Grants issued by the presence gate, consumed by cipher finalization.
#[derive(Clone, Default)]
pub struct AuthLedger {
    granted: Arc<Mutex<HashSet<u64>>>,
    next_id: Arc<AtomicU64>,
}

impl AuthLedger {
    fn issue(&self) -> GrantId {
        GrantId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Authorize one finalization of the handle with `id`.
    pub fn grant(&self, id: GrantId) {
        if let Ok(mut granted) = self.granted.lock() {
            granted.insert(id.0);
        }
    }

    /// Take the grant for `id`. A poisoned ledger grants nothing.
    fn consume(&self, id: GrantId) -> bool {
        self.granted
            .lock()
            .map(|mut granted| granted.remove(&id.0))
            .unwrap_or(false)
    }
}

/// Confirms that the user is present (fingerprint, terminal confirmation, ...).
#[async_trait]
pub trait PresenceCheck: Send + Sync {
    fn capability(&self) -> Capability;

    /// `Err(FechaduraError::BiometricDenied)` on failure or cancellation.
    async fn confirm(&self, prompt: &PromptInfo) -> Result<(), FechaduraError>;
}

/// Software implementation of [`SecureKeyProvider`].
pub struct SoftwareKeyStore {
    store: Arc<dyn KeyValueStore>,
    ledger: AuthLedger,
}

impl SoftwareKeyStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            ledger: AuthLedger::default(),
        }
    }

    /// The biometric gate paired with this store's grant ledger.
    pub fn gate(&self, presence: Arc<dyn PresenceCheck>) -> PresenceGate {
        PresenceGate {
            presence,
            ledger: self.ledger.clone(),
        }
    }

    /// Whether a key named `name` exists.
    pub async fn has_key(&self, name: &str) -> Result<bool, FechaduraError> {
        Ok(self.store.get(&record_name(name)).await?.is_some())
    }

    /// Permanently delete the key named `name`. Absent keys are ignored.
    pub async fn delete_key(&self, name: &str) -> Result<(), FechaduraError> {
        self.store.remove(&record_name(name)).await?;
        info!(key = name, "deleted key");
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<(Zeroizing<[u8; 32]>, bool)>, FechaduraError> {
        let Some(raw) = self.store.get(&record_name(name)).await? else {
            return Ok(None);
        };
        let stored: StoredKey = serde_json::from_str(&raw)
            .map_err(|e| FechaduraError::KeyStore(format!("corrupted key `{name}`: {e}")))?;
        let bytes = Zeroizing::new(
            STANDARD
                .decode(stored.key.as_bytes())
                .map_err(|e| FechaduraError::KeyStore(format!("corrupted key `{name}`: {e}")))?,
        );
        let key: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            FechaduraError::KeyStore(format!(
                "key `{name}` must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Some((Zeroizing::new(key), stored.auth_required)))
    }
}

fn record_name(name: &str) -> String {
    format!("{KEY_PREFIX}{name}")
}

#[async_trait]
impl SecureKeyProvider for SoftwareKeyStore {
    async fn get_or_create_key(&self, spec: &KeySpec) -> Result<KeyAlias, FechaduraError> {
        if spec.key_size_bits != 256 {
            return Err(FechaduraError::KeyStore(format!(
                "unsupported key size {} bits; only AES-256 is available",
                spec.key_size_bits
            )));
        }

        if self.load(&spec.name).await?.is_some() {
            return Ok(KeyAlias(spec.name.clone()));
        }

        let key = crypto::generate_random_key()?;
        let stored = StoredKey {
            key: STANDARD.encode(key.as_slice()),
            auth_required: spec.user_authentication_required,
        };
        let json = Zeroizing::new(
            serde_json::to_string(&stored)
                .map_err(|e| FechaduraError::KeyStore(format!("failed to encode key: {e}")))?,
        );
        self.store.put(&record_name(&spec.name), &json).await?;
        debug!(
            key = %spec.name,
            auth_required = spec.user_authentication_required,
            "created key"
        );
        Ok(KeyAlias(spec.name.clone()))
    }

    async fn new_cipher(
        &self,
        key: &KeyAlias,
        mode: CipherMode,
    ) -> Result<Box<dyn CipherHandle>, FechaduraError> {
        let (bytes, auth_required) = self
            .load(&key.0)
            .await?
            .ok_or_else(|| FechaduraError::KeyStore(format!("key `{}` not found", key.0)))?;

        let iv = match mode {
            CipherMode::Encrypt => crypto::random_iv()?,
            CipherMode::Decrypt { iv } => iv,
        };

        Ok(Box::new(SoftwareCipher {
            name: key.0.clone(),
            key: bytes,
            auth_required,
            mode,
            iv,
            grant: self.ledger.issue(),
            ledger: self.ledger.clone(),
        }))
    }
}

/// One-shot AES-256-GCM cipher over a software key.
pub struct SoftwareCipher {
    name: String,
    key: Zeroizing<[u8; 32]>,
    auth_required: bool,
    mode: CipherMode,
    iv: [u8; IV_LEN],
    grant: GrantId,
    ledger: AuthLedger,
}

impl CipherHandle for SoftwareCipher {
    fn mode(&self) -> CipherMode {
        self.mode
    }

    fn iv(&self) -> [u8; IV_LEN] {
        self.iv
    }

    fn grant_id(&self) -> GrantId {
        self.grant
    }

    fn do_final(self: Box<Self>, input: &[u8]) -> Result<Vec<u8>, FechaduraError> {
        if self.auth_required && !self.ledger.consume(self.grant) {
            return Err(FechaduraError::UserNotAuthenticated(self.name));
        }
        match self.mode {
            CipherMode::Encrypt => crypto::seal_with_iv(&self.key, &self.iv, input),
            CipherMode::Decrypt { iv } => {
                crypto::open_with_iv(&self.key, &iv, input).map(|plain| plain.to_vec())
            }
        }
    }
}

/// [`BiometricGate`] that grants handles of one [`SoftwareKeyStore`] after a
/// successful [`PresenceCheck`].
pub struct PresenceGate {
    presence: Arc<dyn PresenceCheck>,
    ledger: AuthLedger,
}

#[async_trait]
impl BiometricGate for PresenceGate {
    fn capability(&self) -> Capability {
        self.presence.capability()
    }

    async fn authenticate(
        &self,
        prompt: &PromptInfo,
        cipher: Box<dyn CipherHandle>,
    ) -> Result<Box<dyn CipherHandle>, FechaduraError> {
        self.presence.confirm(prompt).await.map_err(|e| match e {
            FechaduraError::BiometricDenied(_) => e,
            other => FechaduraError::BiometricDenied(other.to_string()),
        })?;
        self.ledger.grant(cipher.grant_id());
        debug!(grant = cipher.grant_id().0, "presence confirmed, cipher granted");
        Ok(cipher)
    }
}
