// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secure key provider: the hardware-backed store holding the wrapping key.
//!
//! The provider only exposes "get or create a named key" and "build a cipher
//! handle for it". Key bytes never cross this boundary. Whether a handle may
//! be finalized is decided by the provider: a key created with
//! `user_authentication_required` only finalizes handles its paired gate has
//! granted.

use async_trait::async_trait;

use crate::blob::IV_LEN;
use crate::error::FechaduraError;

/// Parameters for creating a wrapping key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    /// Stable name of the key inside the provider.
    pub name: String,
    /// Key size in bits.
    pub key_size_bits: u32,
    /// Require a fresh authentication event for every use.
    pub user_authentication_required: bool,
}

impl KeySpec {
    /// AES-256-GCM, authentication required.
    pub fn aes_gcm_256(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_size_bits: 256,
            user_authentication_required: true,
        }
    }
}

/// Opaque reference to a key held by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyAlias(pub String);

/// Identifies one cipher handle for authentication grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrantId(pub u64);

/// How to initialize a cipher handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    /// Encrypt with a fresh IV chosen by the provider.
    Encrypt,
    /// Decrypt with the IV carried by the blob.
    Decrypt { iv: [u8; IV_LEN] },
}

/// A cipher initialized inside the secure store, usable for exactly one
/// `do_final` call.
pub trait CipherHandle: Send + Sync {
    /// Mode the handle was initialized with.
    fn mode(&self) -> CipherMode;

    /// IV in use (fresh for encrypt handles, the supplied one for decrypt).
    fn iv(&self) -> [u8; IV_LEN];

    /// Identity used by the paired gate to grant this handle.
    fn grant_id(&self) -> GrantId;

    /// Run the AEAD operation over `input` and consume the handle.
    ///
    /// Decrypt handles fail with [`FechaduraError::AuthenticationFailure`] on
    /// tag mismatch; gated keys fail with
    /// [`FechaduraError::UserNotAuthenticated`] without a grant.
    fn do_final(self: Box<Self>, input: &[u8]) -> Result<Vec<u8>, FechaduraError>;
}

/// Capability provider for hardware-held keys.
#[async_trait]
pub trait SecureKeyProvider: Send + Sync {
    /// Return the key named in `spec`, creating it with `spec` if absent.
    async fn get_or_create_key(&self, spec: &KeySpec) -> Result<KeyAlias, FechaduraError>;

    /// Build a cipher handle bound to `key`.
    async fn new_cipher(
        &self,
        key: &KeyAlias,
        mode: CipherMode,
    ) -> Result<Box<dyn CipherHandle>, FechaduraError>;
}
