// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fechadura status` command implementation.
//!
//! Reports whether a wrapped key is stored (i.e. whether the next unlock
//! skips the password), the presence-check capability, and the publish
//! target.

use std::sync::Arc;

use fechadura_config::FechaduraConfig;
use fechadura_core::{Capability, FechaduraError, KeyValueStore};
use fechadura_vault::{PresenceCheck, SoftwareKeyStore};

use crate::console::ConsolePresence;
use crate::stores::Stores;

/// Snapshot printed by `fechadura status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub record_present: bool,
    pub wrapping_key_present: bool,
    pub credentials_configured: bool,
    pub capability: Capability,
    pub endpoint: Option<String>,
    pub topic: String,
    pub qos: u8,
    pub database_path: String,
    pub keystore_path: String,
}

impl StatusReport {
    /// Whether the next unlock goes straight to the biometric gate.
    pub fn biometric_ready(&self) -> bool {
        self.record_present && self.wrapping_key_present
    }
}

/// Run the `fechadura status` command.
pub async fn run_status(config: &FechaduraConfig, use_color: bool) -> Result<(), FechaduraError> {
    let stores = Stores::open(&config.storage).await?;
    let report = collect_status(
        config,
        stores.records.clone(),
        stores.keys.clone(),
        &ConsolePresence,
    )
    .await?;
    stores.close().await?;
    print_status(&report, use_color);
    Ok(())
}

pub async fn collect_status(
    config: &FechaduraConfig,
    records: Arc<dyn KeyValueStore>,
    keys: Arc<dyn KeyValueStore>,
    presence: &dyn PresenceCheck,
) -> Result<StatusReport, FechaduraError> {
    let record_present = records.get(&config.vault.wrapped_key_name).await?.is_some();
    let wrapping_key_present = SoftwareKeyStore::new(keys)
        .has_key(&config.vault.wrapping_key_name)
        .await?;

    Ok(StatusReport {
        record_present,
        wrapping_key_present,
        credentials_configured: config.vault.encrypted_credentials.is_some(),
        capability: presence.capability(),
        endpoint: config.device.endpoint.clone(),
        topic: config.device.topic.clone(),
        qos: config.device.qos,
        database_path: config.storage.database_path.clone(),
        keystore_path: config.storage.keystore_path.clone(),
    })
}

fn print_status(report: &StatusReport, use_color: bool) {
    let next_unlock = if report.biometric_ready() {
        "biometric"
    } else {
        "password"
    };
    let endpoint = report.endpoint.as_deref().unwrap_or("(not configured)");

    println!();
    println!("  fechadura status");
    println!("  {}", "-".repeat(40));

    if use_color {
        use colored::Colorize;
        let mark = |ok: bool| if ok { "✓".green() } else { "✗".red() };
        println!(
            "    Credentials: {} {}",
            mark(report.credentials_configured),
            if report.credentials_configured { "configured" } else { "missing" }
        );
        println!(
            "    Wrapped key: {} {}",
            mark(report.biometric_ready()),
            if report.record_present { "stored" } else { "none" }
        );
        println!("    Next unlock: {}", next_unlock.bold());
        println!("    Presence:    {}", report.capability);
    } else {
        println!(
            "    Credentials: {}",
            if report.credentials_configured { "configured" } else { "missing" }
        );
        println!(
            "    Wrapped key: {}",
            if report.record_present { "stored" } else { "none" }
        );
        println!("    Next unlock: {next_unlock}");
        println!("    Presence:    {}", report.capability);
    }
    println!("    Endpoint:    {endpoint}");
    println!("    Topic:       {} (qos {})", report.topic, report.qos);
    println!("    Database:    {}", report.database_path);
    println!("    Key store:   {}", report.keystore_path);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use fechadura_test_utils::{ScriptedPresence, TestHarness};

    fn config() -> FechaduraConfig {
        fechadura_config::load_and_validate_str(
            r#"
[device]
endpoint = "abc-ats.iot.us-east-1.amazonaws.com"

[vault]
wrapping_key_name = "fechadura.wrapping_key"
wrapped_key_name = "fechadura.wrapped_decryption_key"
"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn fresh_install_needs_password() {
        let harness = TestHarness::builder().build().unwrap();
        let presence = ScriptedPresence::new(Capability::NoneEnrolled);

        let report = collect_status(
            &config(),
            harness.store.clone(),
            harness.keys.clone(),
            &presence,
        )
        .await
        .unwrap();
        assert!(!report.record_present);
        assert!(!report.biometric_ready());
        assert!(!report.credentials_configured);
        assert_eq!(report.capability, Capability::NoneEnrolled);
        assert_eq!(
            report.endpoint.as_deref(),
            Some("abc-ats.iot.us-east-1.amazonaws.com")
        );
        assert_eq!(report.topic, "fechadura/command");
    }

    #[tokio::test]
    async fn after_first_unlock_biometric_is_ready() {
        let harness = TestHarness::builder().build().unwrap();
        harness.passwords.enter(harness.password.clone()).await;
        harness.orchestrator().run().await.delivery.unwrap().finished().await;

        let report = collect_status(
            &config(),
            harness.store.clone(),
            harness.keys.clone(),
            harness.presence.as_ref(),
        )
        .await
        .unwrap();
        assert!(report.record_present);
        assert!(report.wrapping_key_present);
        assert!(report.biometric_ready());
    }
}
