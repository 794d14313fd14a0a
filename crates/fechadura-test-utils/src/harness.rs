// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end unlock testing.
//!
//! `TestHarness` assembles a complete unlock stack: the wrapped-key record in
//! one in-memory store, the software key store over a second one, scripted
//! presence and password dialogs, a mock publisher, and a recording notifier. Credentials are sealed under a
//! password exactly like the `encrypt` command does.

use std::sync::Arc;

use fechadura_core::{
    Capability, Credentials, EncryptedBlob, FechaduraError, PromptInfo, PublishRequest,
};
use fechadura_vault::{
    codec, Collaborators, CryptoEngine, SoftwareKeyStore, UnlockOrchestrator, UnlockSettings,
};
use secrecy::SecretString;

use crate::mock_publisher::MockPublisher;
use crate::scripted::{MemoryStore, RecordingNotifier, ScriptedPasswordPrompt, ScriptedPresence};

/// Store name of the wrapped-key record used by the harness.
pub const RECORD_NAME: &str = "fechadura.wrapped_decryption_key";

/// Wrapping key name used by the harness.
pub const WRAPPING_KEY_NAME: &str = "fechadura.wrapping_key";

/// Encrypt `credentials` under the key derived from `password`.
pub fn seal_credentials(
    password: &str,
    credentials: &Credentials,
) -> Result<EncryptedBlob, FechaduraError> {
    let key = fechadura_vault::kdf::derive_key_from_password(&SecretString::from(password))?;
    let plaintext = codec::encode(credentials)?;
    fechadura_vault::crypto::seal(key.as_bytes(), plaintext.as_bytes())
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    password: String,
    credentials: Credentials,
    capability: Capability,
    publish_failure: Option<String>,
    request: PublishRequest,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            password: "correct horse battery staple".to_string(),
            credentials: Credentials::new("AKIAEXAMPLE", "secretkeyvalue"),
            capability: Capability::Available,
            publish_failure: None,
            request: PublishRequest::new("fechadura/command", 0),
        }
    }

    /// Password the credential blob is sealed under.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Credentials sealed into the blob.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Capability reported by the presence check.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capability = capability;
        self
    }

    /// Make the publisher fail with a transport error carrying `message`.
    pub fn with_publish_failure(mut self, message: impl Into<String>) -> Self {
        self.publish_failure = Some(message.into());
        self
    }

    /// Command published after a successful unlock.
    pub fn with_request(mut self, request: PublishRequest) -> Self {
        self.request = request;
        self
    }

    /// Build the test harness, sealing the credentials under the password.
    pub fn build(self) -> Result<TestHarness, FechaduraError> {
        let encrypted_credentials = seal_credentials(&self.password, &self.credentials)?;

        let store = Arc::new(MemoryStore::new());
        let keys = Arc::new(MemoryStore::new());
        let keystore = Arc::new(SoftwareKeyStore::new(keys.clone()));
        let presence = Arc::new(ScriptedPresence::new(self.capability));
        let publisher = Arc::new(match self.publish_failure {
            Some(message) => MockPublisher::failing(message),
            None => MockPublisher::new(),
        });

        Ok(TestHarness {
            store,
            keys,
            keystore,
            presence,
            passwords: Arc::new(ScriptedPasswordPrompt::new()),
            publisher,
            notifier: Arc::new(RecordingNotifier::new()),
            settings: UnlockSettings {
                encrypted_credentials,
                wrapped_key_record: RECORD_NAME.to_string(),
                prompt: PromptInfo::default(),
                request: self.request,
            },
            password: self.password,
            credentials: self.credentials,
        })
    }
}

/// A complete test environment with scripted collaborators and an
/// in-memory store.
pub struct TestHarness {
    /// Record store holding the wrapped-key record.
    pub store: Arc<MemoryStore>,
    /// Key store backing `keystore`, never shared with `store`.
    pub keys: Arc<MemoryStore>,
    /// Software secure-key provider over `keys`.
    pub keystore: Arc<SoftwareKeyStore>,
    /// Scripted presence check behind the biometric gate.
    pub presence: Arc<ScriptedPresence>,
    /// Scripted password dialog.
    pub passwords: Arc<ScriptedPasswordPrompt>,
    /// Publisher capturing commands.
    pub publisher: Arc<MockPublisher>,
    /// Notifier capturing notices.
    pub notifier: Arc<RecordingNotifier>,
    /// Settings handed to every orchestrator.
    pub settings: UnlockSettings,
    /// Password the credentials were sealed under.
    pub password: String,
    /// The sealed credentials in plaintext, for assertions.
    pub credentials: Credentials,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A fresh orchestrator wired to this harness's collaborators.
    pub fn orchestrator(&self) -> UnlockOrchestrator {
        let engine = CryptoEngine::new(self.keystore.clone(), WRAPPING_KEY_NAME);
        let collaborators = Collaborators {
            store: self.store.clone(),
            gate: Arc::new(self.keystore.gate(self.presence.clone())),
            passwords: self.passwords.clone(),
            publisher: self.publisher.clone(),
            notifier: self.notifier.clone(),
        };
        UnlockOrchestrator::new(engine, collaborators, self.settings.clone())
    }

    /// The persisted wrapped-key record, if any.
    pub async fn wrapped_key_record(&self) -> Option<String> {
        self.store.value(RECORD_NAME).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_credentials_decrypt_under_the_same_password() {
        let credentials = Credentials::new("AKIAEXAMPLE", "secretkeyvalue");
        let blob = seal_credentials("pw", &credentials).unwrap();

        let key =
            fechadura_vault::kdf::derive_key_from_password(&SecretString::from("pw")).unwrap();
        let plaintext = fechadura_vault::crypto::open(key.as_bytes(), &blob).unwrap();
        assert_eq!(plaintext.as_slice(), b"AKIAEXAMPLE_secretkeyvalue");
    }

    #[tokio::test]
    async fn fresh_harness_has_no_record() {
        let harness = TestHarness::builder().build().unwrap();
        assert!(harness.wrapped_key_record().await.is_none());
        assert!(harness.store.is_empty().await);
        assert!(harness.keys.is_empty().await);
    }

    #[tokio::test]
    async fn unlock_splits_record_and_wrapping_key() {
        let harness = TestHarness::builder().build().unwrap();
        harness.passwords.enter(harness.password.clone()).await;
        harness.orchestrator().run().await.delivery.unwrap().finished().await;

        assert!(harness.wrapped_key_record().await.is_some());
        assert_eq!(harness.store.len().await, 1);
        assert_eq!(harness.keys.len().await, 1);
        assert!(
            harness
                .keys
                .value(&format!("keystore.{WRAPPING_KEY_NAME}"))
                .await
                .is_some()
        );
    }
}
