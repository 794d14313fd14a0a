// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fechadura encrypt`: produce the `[vault] encrypted_credentials` value.

use fechadura_core::{Credentials, EncryptedBlob, FechaduraError};
use fechadura_vault::prompt::read_hidden;
use fechadura_vault::{codec, crypto, get_password_with_confirm, kdf};
use secrecy::SecretString;
use tracing::info;

/// Run the `fechadura encrypt` command.
///
/// Prompts for a new password (confirmed), the identifier and the secret, and
/// prints the encrypted blob on stdout.
pub fn run_encrypt() -> Result<(), FechaduraError> {
    let password = get_password_with_confirm()?;
    let identifier = read_hidden("Identifier: ")?;
    let secret = read_hidden("Secret: ")?;

    let credentials = Credentials::new(identifier.trim(), secret.as_str());
    let blob = encrypt_credentials(&password, &credentials)?;

    info!(
        identifier = %fechadura_vault::mask_identifier(credentials.identifier()),
        "credentials encrypted"
    );
    println!("{blob}");
    eprintln!("Set this value as `encrypted_credentials` in the [vault] section.");
    Ok(())
}

/// Encode and encrypt `credentials` under the key derived from `password`,
/// then decrypt once to make sure the blob reads back.
pub fn encrypt_credentials(
    password: &SecretString,
    credentials: &Credentials,
) -> Result<EncryptedBlob, FechaduraError> {
    let key = kdf::derive_key_from_password(password)?;
    let plaintext = codec::encode(credentials)?;
    let blob = crypto::seal(key.as_bytes(), plaintext.as_bytes())?;

    let reopened = codec::decode(&crypto::open(key.as_bytes(), &blob)?)?;
    if reopened != *credentials {
        return Err(FechaduraError::Internal(
            "encrypted credentials did not read back".to_string(),
        ));
    }
    Ok(blob)
}
