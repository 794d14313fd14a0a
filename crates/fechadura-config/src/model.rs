// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Fechadura lock client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Fechadura configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FechaduraConfig {
    /// Publish target settings.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Encrypted credential and key naming settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Local persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Biometric prompt text.
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Device-control endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// Network address of the publish target (host, or full `https://` URL).
    /// `None` until configured; required by `unlock`.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Deployment region identifier used for request signing.
    #[serde(default = "default_region")]
    pub region: String,

    /// Message routing key.
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Delivery-quality level (0 or 1).
    #[serde(default)]
    pub qos: u8,

    /// Command payload sent on unlock.
    #[serde(default = "default_payload")]
    pub payload: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: default_region(),
            topic: default_topic(),
            qos: 0,
            payload: default_payload(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_topic() -> String {
    "fechadura/command".to_string()
}

fn default_payload() -> String {
    "{}".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Credential blob and key naming configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Serialized encrypted credential pair (`base64(ct)_base64(iv)`), produced
    /// by `fechadura encrypt`. Required by `unlock`.
    #[serde(default)]
    pub encrypted_credentials: Option<String>,

    /// Name of the wrapping key inside the secure key provider.
    #[serde(default = "default_wrapping_key_name")]
    pub wrapping_key_name: String,

    /// Name under which the wrapped decryption key record is persisted.
    #[serde(default = "default_wrapped_key_name")]
    pub wrapped_key_name: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            encrypted_credentials: None,
            wrapping_key_name: default_wrapping_key_name(),
            wrapped_key_name: default_wrapped_key_name(),
        }
    }
}

fn default_wrapping_key_name() -> String {
    "fechadura.wrapping_key".to_string()
}

fn default_wrapped_key_name() -> String {
    "fechadura.wrapped_decryption_key".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database holding the wrapped-key record.
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Path to the SQLCipher database holding the wrapping key.
    #[serde(default = "default_keystore_path")]
    pub keystore_path: String,
    /// File holding the hex-encoded key of the key store database. Created
    /// with owner-only permissions on first use.
    #[serde(default = "default_keystore_key_path")]
    pub keystore_key_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            keystore_path: default_keystore_path(),
            keystore_key_path: default_keystore_key_path(),
        }
    }
}

fn default_database_path() -> String {
    data_file("fechadura.db")
}

fn default_keystore_path() -> String {
    data_file("keystore.db")
}

// Kept under the config dir so a copy of the data dir alone does not carry it.
fn default_keystore_key_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("fechadura").join("keystore.key"))
        .unwrap_or_else(|| std::path::PathBuf::from("keystore.key"))
        .to_string_lossy()
        .into_owned()
}

fn data_file(name: &str) -> String {
    dirs::data_dir()
        .map(|p| p.join("fechadura").join(name))
        .unwrap_or_else(|| std::path::PathBuf::from(name))
        .to_string_lossy()
        .into_owned()
}

/// Text shown by the biometric prompt.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    #[serde(default = "default_prompt_title")]
    pub title: String,

    #[serde(default = "default_negative_button")]
    pub negative_button: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            title: default_prompt_title(),
            negative_button: default_negative_button(),
        }
    }
}

fn default_prompt_title() -> String {
    "Unlock with your fingerprint".to_string()
}

fn default_negative_button() -> String {
    "Cancel".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
