// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plaintext framing of the credential pair: `identifier + "_" + secret`.
//!
//! Decoding splits at the first separator, so secrets may contain `_`.
//! Encoding refuses identifiers that contain one.

use fechadura_core::{Credentials, FechaduraError};
use secrecy::ExposeSecret;
use zeroize::Zeroizing;

/// Separator between identifier and secret.
pub const CREDENTIAL_SEPARATOR: char = '_';

/// Serialize credentials into the plaintext that gets encrypted.
pub fn encode(credentials: &Credentials) -> Result<Zeroizing<String>, FechaduraError> {
    let identifier = credentials.identifier();
    let secret = credentials.secret().expose_secret();

    if identifier.is_empty() {
        return Err(FechaduraError::Format(
            "credential identifier must not be empty".to_string(),
        ));
    }
    if identifier.contains(CREDENTIAL_SEPARATOR) {
        return Err(FechaduraError::Format(format!(
            "credential identifier must not contain `{CREDENTIAL_SEPARATOR}`"
        )));
    }
    if secret.is_empty() {
        return Err(FechaduraError::Format(
            "credential secret must not be empty".to_string(),
        ));
    }

    let mut plaintext = Zeroizing::new(String::with_capacity(
        identifier.len() + 1 + secret.len(),
    ));
    plaintext.push_str(identifier);
    plaintext.push(CREDENTIAL_SEPARATOR);
    plaintext.push_str(secret);
    Ok(plaintext)
}

/// Parse decrypted plaintext back into credentials.
pub fn decode(plaintext: &[u8]) -> Result<Credentials, FechaduraError> {
    let text = std::str::from_utf8(plaintext).map_err(|_| {
        FechaduraError::Format("credential plaintext is not valid UTF-8".to_string())
    })?;

    let (identifier, secret) = text.split_once(CREDENTIAL_SEPARATOR).ok_or_else(|| {
        FechaduraError::Format(format!(
            "credential plaintext is missing the `{CREDENTIAL_SEPARATOR}` separator"
        ))
    })?;

    if identifier.is_empty() || secret.is_empty() {
        return Err(FechaduraError::Format(
            "credential plaintext has an empty field".to_string(),
        ));
    }

    Ok(Credentials::new(identifier, secret))
}
