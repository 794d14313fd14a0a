// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Fechadura lock client.

use thiserror::Error;

/// The primary error type used across all Fechadura collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum FechaduraError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed serialized blob or credential plaintext (missing separator,
    /// invalid base64, wrong IV length).
    #[error("format error: {0}")]
    Format(String),

    /// AEAD tag mismatch: wrong key or tampered ciphertext/IV.
    #[error("authentication failure -- wrong key or corrupted data")]
    AuthenticationFailure,

    /// The biometric gate failed or was cancelled.
    #[error("biometric authentication denied: {0}")]
    BiometricDenied(String),

    /// A previously trusted persisted record no longer unwraps or decrypts.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// The publish step failed.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Secure key provider errors (key generation, unusable key record).
    #[error("key store error: {0}")]
    KeyStore(String),

    /// A cipher bound to an authentication-gated key was finalized without a grant.
    #[error("key `{0}` requires user authentication before use")]
    UserNotAuthenticated(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FechaduraError {
    /// Short human-readable detail used in user-facing error notices.
    pub fn detail(&self) -> String {
        match self {
            Self::Transport { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
