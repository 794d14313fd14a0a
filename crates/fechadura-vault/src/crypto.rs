// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] generates a fresh random 96-bit IV via the system
//! CSPRNG. IV reuse would be catastrophic for GCM security.

pub use fechadura_core::TAG_LEN;
use fechadura_core::{EncryptedBlob, FechaduraError, IV_LEN};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

fn aead_key(key: &[u8; 32]) -> Result<LessSafeKey, FechaduraError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| FechaduraError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with AES-256-GCM under a fresh random IV.
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<EncryptedBlob, FechaduraError> {
    let iv = random_iv()?;
    let ciphertext = seal_with_iv(key, &iv, plaintext)?;
    Ok(EncryptedBlob::new(ciphertext, iv))
}

/// Encrypt with a caller-chosen IV. The IV must never repeat for a key.
pub fn seal_with_iv(
    key: &[u8; 32],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, FechaduraError> {
    let less_safe = aead_key(key)?;
    let nonce = Nonce::assume_unique_for_key(*iv);

    // Seal in place: plaintext buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    less_safe
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| FechaduraError::Internal("AES-256-GCM encryption failed".to_string()))?;

    Ok(in_out)
}

/// Decrypt a blob with AES-256-GCM.
///
/// Fails with [`FechaduraError::AuthenticationFailure`] when the key is wrong,
/// the ciphertext or IV was altered, or the ciphertext is shorter than a tag.
pub fn open(key: &[u8; 32], blob: &EncryptedBlob) -> Result<Zeroizing<Vec<u8>>, FechaduraError> {
    open_with_iv(key, &blob.iv, &blob.ciphertext)
}

pub fn open_with_iv(
    key: &[u8; 32],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, FechaduraError> {
    let less_safe = aead_key(key)?;
    let nonce = Nonce::assume_unique_for_key(*iv);

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext = less_safe
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| FechaduraError::AuthenticationFailure)?;

    Ok(Zeroizing::new(plaintext.to_vec()))
}

/// Generate a random 96-bit IV.
pub fn random_iv() -> Result<[u8; IV_LEN], FechaduraError> {
    let rng = SystemRandom::new();
    let mut iv = [0u8; IV_LEN];
    rng.fill(&mut iv)
        .map_err(|_| FechaduraError::Internal("failed to generate random IV".to_string()))?;
    Ok(iv)
}

/// Generate a random 32-byte key suitable for AES-256-GCM.
pub fn generate_random_key() -> Result<Zeroizing<[u8; 32]>, FechaduraError> {
    let rng = SystemRandom::new();
    let mut key = Zeroizing::new([0u8; 32]);
    rng.fill(key.as_mut())
        .map_err(|_| FechaduraError::KeyStore("failed to generate random key".to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let key = generate_random_key().unwrap();
        let plaintext = b"AKIAEXAMPLE_secretkeyvalue";

        let blob = seal(&key, plaintext).unwrap();
        let decrypted = open(&key, &blob).unwrap();

        assert_eq!(decrypted.as_slice(), plaintext);
    }

    #[test]
    fn seal_produces_different_ciphertext_for_same_plaintext() {
        let key = generate_random_key().unwrap();
        let plaintext = b"same input twice";

        let blob1 = seal(&key, plaintext).unwrap();
        let blob2 = seal(&key, plaintext).unwrap();

        // Random IVs should differ.
        assert_ne!(blob1.iv, blob2.iv);
        assert_ne!(blob1.ciphertext, blob2.ciphertext);
    }

    #[test]
    fn open_with_wrong_key_fails() {
        let key1 = generate_random_key().unwrap();
        let key2 = generate_random_key().unwrap();

        let blob = seal(&key1, b"secret data").unwrap();
        let result = open(&key2, &blob);

        assert!(matches!(result, Err(FechaduraError::AuthenticationFailure)));
    }

    #[test]
    fn ciphertext_is_longer_than_plaintext() {
        let key = generate_random_key().unwrap();
        let plaintext = b"hello";

        let blob = seal(&key, plaintext).unwrap();

        assert_eq!(blob.ciphertext.len(), plaintext.len() + TAG_LEN);
    }

    #[test]
    fn tampered_ciphertext_fails_decryption() {
        let key = generate_random_key().unwrap();

        let mut blob = seal(&key, b"do not tamper").unwrap();
        // Flip a bit.
        blob.ciphertext[0] ^= 0x01;

        assert!(matches!(
            open(&key, &blob),
            Err(FechaduraError::AuthenticationFailure)
        ));
    }

    #[test]
    fn tampered_iv_fails_decryption() {
        let key = generate_random_key().unwrap();

        let mut blob = seal(&key, b"do not tamper").unwrap();
        blob.iv[11] ^= 0x80;

        assert!(matches!(
            open(&key, &blob),
            Err(FechaduraError::AuthenticationFailure)
        ));
    }

    #[test]
    fn truncated_ciphertext_fails_decryption() {
        let key = generate_random_key().unwrap();
        let blob = EncryptedBlob::new(vec![1, 2, 3], [0u8; IV_LEN]);

        assert!(matches!(
            open(&key, &blob),
            Err(FechaduraError::AuthenticationFailure)
        ));
    }

    #[test]
    fn seal_with_iv_is_deterministic() {
        let key = [7u8; 32];
        let iv = [9u8; IV_LEN];

        let ct1 = seal_with_iv(&key, &iv, b"payload").unwrap();
        let ct2 = seal_with_iv(&key, &iv, b"payload").unwrap();

        assert_eq!(ct1, ct2);
        assert_eq!(open_with_iv(&key, &iv, &ct1).unwrap().as_slice(), b"payload");
    }
}
