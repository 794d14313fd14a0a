// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the collaborator traits and the unlock flow.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default command payload when none is configured: an empty JSON object.
pub const DEFAULT_PAYLOAD: &str = "{}";

/// Service credentials unlocked by the vault and handed to the publisher.
///
/// Debug output intentionally omits the secret.
#[derive(Clone)]
pub struct Credentials {
    identifier: String,
    secret: SecretString,
}

impl Credentials {
    /// Build credentials from an identifier (access key id) and secret.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// The non-secret identifier half (e.g. `AKIA...`).
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The secret half.
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }
}

impl PartialEq for Credentials {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.secret.expose_secret() == other.secret.expose_secret()
    }
}

impl Eq for Credentials {}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// A single command to publish to the device-control endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Message routing key.
    pub topic: String,
    /// Delivery-quality level.
    pub qos: u8,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

impl PublishRequest {
    /// A request carrying the default `{}` payload.
    pub fn new(topic: impl Into<String>, qos: u8) -> Self {
        Self {
            topic: topic.into(),
            qos,
            payload: DEFAULT_PAYLOAD.as_bytes().to_vec(),
        }
    }

    /// Replace the payload.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }
}

/// User-facing status messages. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The device has no usable biometric hardware or enrollment.
    DeviceUnsupported,
    /// The command is being sent.
    Sending,
    /// The command was delivered.
    Success,
    /// The password did not decrypt the stored credentials.
    WrongPassword,
    /// Templated error with detail.
    Error(String),
}

/// Prefix of [`Notice::Error`] messages.
pub const ERROR_TEMPLATE: &str = "Error: ";

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceUnsupported => {
                f.write_str("This device does not support biometric authentication")
            }
            Self::Sending => f.write_str("Sending command..."),
            Self::Success => f.write_str("Command sent successfully"),
            Self::WrongPassword => f.write_str("Incorrect password"),
            Self::Error(detail) => write!(f, "{ERROR_TEMPLATE}{detail}"),
        }
    }
}

/// Text shown by the biometric gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptInfo {
    pub title: String,
    pub negative_button: String,
}

impl Default for PromptInfo {
    fn default() -> Self {
        Self {
            title: "Unlock with your fingerprint".to_string(),
            negative_button: "Cancel".to_string(),
        }
    }
}

/// Result of the biometric capability check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    Available,
    NoHardware,
    NoneEnrolled,
    Unavailable,
}
