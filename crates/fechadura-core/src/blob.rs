// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ciphertext + IV value type and its canonical text form.
//!
//! Text form is `base64(ciphertext) + "_" + base64(iv)` with the standard
//! padded alphabet, which never produces `_`.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::FechaduraError;

/// AES-GCM nonce size in bytes.
pub const IV_LEN: usize = 12;

/// GCM authentication tag length at the end of every ciphertext.
pub const TAG_LEN: usize = 16;

/// Separator between the ciphertext and IV segments.
pub const BLOB_SEPARATOR: char = '_';

/// Output of every encrypt/wrap operation and input of every decrypt/unwrap.
///
/// `ciphertext` includes the 16-byte GCM tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncryptedBlob {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_LEN],
}

impl EncryptedBlob {
    pub fn new(ciphertext: Vec<u8>, iv: [u8; IV_LEN]) -> Self {
        Self { ciphertext, iv }
    }
}

impl fmt::Display for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{BLOB_SEPARATOR}{}",
            STANDARD.encode(&self.ciphertext),
            STANDARD.encode(self.iv)
        )
    }
}

impl FromStr for EncryptedBlob {
    type Err = FechaduraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ciphertext_part, iv_part) = s.trim().split_once(BLOB_SEPARATOR).ok_or_else(|| {
            FechaduraError::Format("encrypted blob is missing the `_` separator".to_string())
        })?;
        if iv_part.contains(BLOB_SEPARATOR) {
            return Err(FechaduraError::Format(
                "encrypted blob has more than one `_` separator".to_string(),
            ));
        }

        let ciphertext = STANDARD
            .decode(ciphertext_part)
            .map_err(|e| FechaduraError::Format(format!("invalid base64 ciphertext: {e}")))?;
        let iv_bytes = STANDARD
            .decode(iv_part)
            .map_err(|e| FechaduraError::Format(format!("invalid base64 IV: {e}")))?;
        let iv: [u8; IV_LEN] = iv_bytes.try_into().map_err(|v: Vec<u8>| {
            FechaduraError::Format(format!("IV must be {IV_LEN} bytes, got {}", v.len()))
        })?;

        Ok(Self { ciphertext, iv })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn serializes_to_canonical_form() {
        let blob = EncryptedBlob::new(vec![1, 2, 3], [0u8; IV_LEN]);
        assert_eq!(blob.to_string(), "AQID_AAAAAAAAAAAAAAAA");
    }

    #[test]
    fn missing_separator_is_format_error() {
        let err = "AQIDAAAAAAAAAAAAAAAA".parse::<EncryptedBlob>().unwrap_err();
        assert!(matches!(err, FechaduraError::Format(_)));
    }

    #[test]
    fn invalid_base64_is_format_error() {
        let err = "not*base64_AAAAAAAAAAAAAAAA".parse::<EncryptedBlob>().unwrap_err();
        assert!(matches!(err, FechaduraError::Format(_)));
    }

    #[test]
    fn short_iv_is_format_error() {
        let err = "AQID_AAAA".parse::<EncryptedBlob>().unwrap_err();
        assert!(err.to_string().contains("12 bytes"));
    }

    #[test]
    fn extra_separator_is_format_error() {
        let err = "AQID_AAAAAAAAAAAAAAAA_AQID".parse::<EncryptedBlob>().unwrap_err();
        assert!(matches!(err, FechaduraError::Format(_)));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let blob: EncryptedBlob = "  AQID_AAAAAAAAAAAAAAAA\n".parse().unwrap();
        assert_eq!(blob.ciphertext, vec![1, 2, 3]);
    }

    proptest! {
        #[test]
        fn text_form_round_trips(
            ciphertext in proptest::collection::vec(any::<u8>(), 0..256),
            iv in any::<[u8; IV_LEN]>(),
        ) {
            let blob = EncryptedBlob::new(ciphertext, iv);
            let parsed: EncryptedBlob = blob.to_string().parse().unwrap();
            prop_assert_eq!(parsed, blob);
        }
    }
}
