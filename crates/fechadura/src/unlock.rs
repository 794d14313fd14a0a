// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fechadura unlock`: wire the production collaborators and run one session.

use std::sync::Arc;
use std::time::Duration;

use fechadura_config::FechaduraConfig;
use fechadura_core::{EncryptedBlob, FechaduraError, PromptInfo, PublishRequest};
use fechadura_iot::IotDataPublisher;
use fechadura_vault::{
    Collaborators, CryptoEngine, TerminalPasswordPrompt, UnlockOrchestrator, UnlockSettings,
    UnlockState,
};
use tracing::{info, warn};

use crate::console::{ConsoleNotifier, ConsolePresence};
use crate::stores::Stores;

/// Run the `fechadura unlock` command and wait for the publish to finish.
pub async fn run_unlock(
    config: &FechaduraConfig,
    payload: Option<String>,
    use_color: bool,
) -> Result<UnlockState, FechaduraError> {
    let settings = unlock_settings(config, payload)?;
    let endpoint = config.device.endpoint.as_deref().ok_or_else(|| {
        FechaduraError::Config("device.endpoint is required for unlock".to_string())
    })?;
    let publisher = IotDataPublisher::new(
        endpoint,
        config.device.region.clone(),
        Duration::from_secs(config.device.timeout_secs),
    )?;

    let stores = Stores::open(&config.storage).await?;
    let keystore = Arc::new(stores.keystore());
    let gate = keystore.gate(Arc::new(ConsolePresence));
    let engine = CryptoEngine::new(keystore, config.vault.wrapping_key_name.clone());

    let collaborators = Collaborators {
        store: stores.records.clone(),
        gate: Arc::new(gate),
        passwords: Arc::new(TerminalPasswordPrompt),
        publisher: Arc::new(publisher),
        notifier: Arc::new(ConsoleNotifier::new(use_color)),
    };

    let mut orchestrator = UnlockOrchestrator::new(engine, collaborators, settings);
    let outcome = orchestrator.run().await;
    if let Some(delivery) = outcome.delivery {
        delivery.finished().await;
    }
    info!(state = %outcome.state, "unlock session finished");

    if let Err(e) = stores.close().await {
        warn!(error = %e, "failed to checkpoint databases");
    }
    Ok(outcome.state)
}

/// Build the session inputs from configuration. `payload` overrides
/// `device.payload`.
pub fn unlock_settings(
    config: &FechaduraConfig,
    payload: Option<String>,
) -> Result<UnlockSettings, FechaduraError> {
    let encrypted_credentials: EncryptedBlob = config
        .vault
        .encrypted_credentials
        .as_deref()
        .ok_or_else(|| {
            FechaduraError::Config(
                "vault.encrypted_credentials is not set; run `fechadura encrypt` first"
                    .to_string(),
            )
        })?
        .parse()?;

    let payload = payload.unwrap_or_else(|| config.device.payload.clone());
    Ok(UnlockSettings {
        encrypted_credentials,
        wrapped_key_record: config.vault.wrapped_key_name.clone(),
        prompt: PromptInfo {
            title: config.prompt.title.clone(),
            negative_button: config.prompt.negative_button.clone(),
        },
        request: PublishRequest::new(config.device.topic.clone(), config.device.qos)
            .with_payload(payload),
    })
}
