// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as the QoS range, topic syntax, and a well-formed credential blob.
//! Device and credential failures carry their own diagnostics; the loader
//! points them at the offending value.

use fechadura_core::{EncryptedBlob, TAG_LEN};

use crate::diagnostic::ConfigError;
use crate::model::FechaduraConfig;

/// Highest QoS level the publish endpoint accepts.
pub const MAX_QOS: u8 = 1;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &FechaduraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    validate_device(config, &mut errors);

    if let Some(blob) = &config.vault.encrypted_credentials {
        match blob.parse::<EncryptedBlob>() {
            Err(e) => errors.push(ConfigError::credentials(e.detail())),
            Ok(blob) if blob.ciphertext.len() < TAG_LEN => {
                errors.push(ConfigError::credentials(format!(
                    "ciphertext is {} bytes, shorter than the {TAG_LEN}-byte authentication tag",
                    blob.ciphertext.len()
                )));
            }
            Ok(_) => {}
        }
    }

    if config.vault.wrapping_key_name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.wrapping_key_name must not be empty".to_string(),
        });
    }

    if config.vault.wrapped_key_name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.wrapped_key_name must not be empty".to_string(),
        });
    }

    if config.vault.wrapping_key_name == config.vault.wrapped_key_name {
        errors.push(ConfigError::Validation {
            message: "vault.wrapping_key_name and vault.wrapped_key_name must differ".to_string(),
        });
    }

    let storage = &config.storage;
    for (key, path) in [
        ("database_path", &storage.database_path),
        ("keystore_path", &storage.keystore_path),
        ("keystore_key_path", &storage.keystore_key_path),
    ] {
        if path.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("storage.{key} must not be empty"),
            });
        }
    }
    if storage.keystore_path == storage.database_path {
        errors.push(ConfigError::Validation {
            message: "storage.keystore_path must not be the record database".to_string(),
        });
    }

    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` must be one of: {}",
                config.log.level,
                LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_device(config: &FechaduraConfig, errors: &mut Vec<ConfigError>) {
    let device = &config.device;

    if let Some(endpoint) = &device.endpoint {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            errors.push(ConfigError::device(
                "endpoint",
                "must not be empty when set",
                "remove the key or set your account's IoT data endpoint host",
            ));
        } else if endpoint.chars().any(char::is_whitespace) {
            errors.push(ConfigError::device(
                "endpoint",
                format!("`{endpoint}` contains whitespace"),
                "use the bare host name, e.g. `abc123-ats.iot.us-east-1.amazonaws.com`",
            ));
        }
    }

    let region = device.region.trim();
    if region.is_empty()
        || !region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        errors.push(ConfigError::device(
            "region",
            format!("`{region}` is not a valid region identifier"),
            "use a lowercase region code such as `us-east-1`",
        ));
    }

    let topic = &device.topic;
    if topic.trim().is_empty() {
        errors.push(ConfigError::device(
            "topic",
            "must not be empty",
            "set the topic the lock listens on, e.g. `fechadura/command`",
        ));
    } else if topic.contains('+') || topic.contains('#') {
        errors.push(ConfigError::device(
            "topic",
            format!("`{topic}` contains wildcards"),
            "`+` and `#` only match when subscribing; publish to a concrete topic",
        ));
    }

    if device.qos > MAX_QOS {
        errors.push(ConfigError::device(
            "qos",
            format!("must be 0 or {MAX_QOS}, got {}", device.qos),
            "the IoT data endpoint accepts at-most-once (0) or at-least-once (1)",
        ));
    }

    if device.timeout_secs == 0 {
        errors.push(ConfigError::device(
            "timeout_secs",
            "must be at least 1",
            "a publish that cannot finish in time is reported as a failure",
        ));
    }
}
