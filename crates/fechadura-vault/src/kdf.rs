// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from the unlock password.
//!
//! The salt and iteration count are fixed: every credential blob already
//! deployed was encrypted under a key derived with exactly these values.

use std::num::NonZeroU32;

use fechadura_core::FechaduraError;
use ring::pbkdf2;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 10_000;

/// Fixed PBKDF2 salt.
pub const KDF_SALT: [u8; 16] = [
    10, 13, 243, 3, 154, 23, 125, 82, 127, 135, 212, 43, 134, 151, 188, 206,
];

/// A 256-bit symmetric key, zeroed on drop.
///
/// Debug output intentionally omits the key bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a 32-byte key from `secret` with PBKDF2-HMAC-SHA256.
pub fn derive_key(secret: &[u8], salt: &[u8], iterations: u32) -> Result<DerivedKey, FechaduraError> {
    let iterations = NonZeroU32::new(iterations).ok_or_else(|| {
        FechaduraError::Internal("PBKDF2 iteration count must be non-zero".to_string())
    })?;

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        secret,
        output.as_mut(),
    );
    Ok(DerivedKey(output))
}

/// Derive the credential key from the user's password (UTF-8 bytes) with the
/// fixed salt and iteration count.
pub fn derive_key_from_password(password: &SecretString) -> Result<DerivedKey, FechaduraError> {
    derive_key(
        password.expose_secret().as_bytes(),
        &KDF_SALT,
        PBKDF2_ITERATIONS,
    )
}
