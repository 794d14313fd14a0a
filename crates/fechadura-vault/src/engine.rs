// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crypto engine: password KDF, credential AEAD, and key wrapping under the
//! provider-held wrapping key.

use std::sync::Arc;

use fechadura_core::{
    CipherHandle, CipherMode, EncryptedBlob, FechaduraError, KeySpec, SecureKeyProvider,
};
use secrecy::SecretString;
use zeroize::Zeroizing;

use crate::crypto;
use crate::kdf::{self, DerivedKey, KEY_LEN};

/// Stateless apart from the provider handle and the wrapping key's spec.
pub struct CryptoEngine {
    provider: Arc<dyn SecureKeyProvider>,
    wrapping_key: KeySpec,
}

impl CryptoEngine {
    /// Engine whose wrapping key is the AES-256-GCM, auth-required key
    /// named `wrapping_key_name`.
    pub fn new(provider: Arc<dyn SecureKeyProvider>, wrapping_key_name: impl Into<String>) -> Self {
        Self {
            provider,
            wrapping_key: KeySpec::aes_gcm_256(wrapping_key_name),
        }
    }

    pub fn wrapping_key_name(&self) -> &str {
        &self.wrapping_key.name
    }

    pub fn derive_key_from_password(
        &self,
        password: &SecretString,
    ) -> Result<DerivedKey, FechaduraError> {
        kdf::derive_key_from_password(password)
    }

    /// AES-256-GCM under a fresh random IV.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        key: &DerivedKey,
    ) -> Result<EncryptedBlob, FechaduraError> {
        crypto::seal(key.as_bytes(), plaintext)
    }

    /// Returns [`FechaduraError::AuthenticationFailure`] when the tag does not verify.
    pub fn decrypt(
        &self,
        blob: &EncryptedBlob,
        key: &DerivedKey,
    ) -> Result<Zeroizing<Vec<u8>>, FechaduraError> {
        crypto::open(key.as_bytes(), blob)
    }

    /// Encrypt-mode handle over the wrapping key, creating the key if needed.
    pub async fn init_wrap_cipher(&self) -> Result<Box<dyn CipherHandle>, FechaduraError> {
        let alias = self.provider.get_or_create_key(&self.wrapping_key).await?;
        self.provider.new_cipher(&alias, CipherMode::Encrypt).await
    }

    /// Decrypt-mode handle over the wrapping key using the IV in `blob`.
    pub async fn init_unwrap_cipher(
        &self,
        blob: &EncryptedBlob,
    ) -> Result<Box<dyn CipherHandle>, FechaduraError> {
        let alias = self.provider.get_or_create_key(&self.wrapping_key).await?;
        self.provider
            .new_cipher(&alias, CipherMode::Decrypt { iv: blob.iv })
            .await
    }

    /// Encrypt the raw key bytes with an (authorized) encrypt handle.
    pub fn wrap(
        &self,
        key: &DerivedKey,
        handle: Box<dyn CipherHandle>,
    ) -> Result<EncryptedBlob, FechaduraError> {
        if handle.mode() != CipherMode::Encrypt {
            return Err(FechaduraError::Internal(
                "wrap requires an encrypt-mode cipher".to_string(),
            ));
        }
        let iv = handle.iv();
        let ciphertext = handle.do_final(key.as_bytes())?;
        Ok(EncryptedBlob::new(ciphertext, iv))
    }

    /// Decrypt a wrapped key with an (authorized) decrypt handle.
    pub fn unwrap(
        &self,
        ciphertext: &[u8],
        handle: Box<dyn CipherHandle>,
    ) -> Result<DerivedKey, FechaduraError> {
        if !matches!(handle.mode(), CipherMode::Decrypt { .. }) {
            return Err(FechaduraError::Internal(
                "unwrap requires a decrypt-mode cipher".to_string(),
            ));
        }
        let plain = Zeroizing::new(handle.do_final(ciphertext)?);
        let bytes: [u8; KEY_LEN] = plain.as_slice().try_into().map_err(|_| {
            FechaduraError::Format(format!(
                "unwrapped key must be {KEY_LEN} bytes, got {}",
                plain.len()
            ))
        })?;
        Ok(DerivedKey::from_bytes(bytes))
    }
}
