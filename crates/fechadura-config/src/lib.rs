// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Fechadura lock client.
//!
//! `fechadura.toml` is read from the XDG hierarchy with `FECHADURA_*`
//! environment overrides, rejected on unknown keys, then checked for values
//! the lock client cannot use. Every failure is a miette [`ConfigError`].
//!
//! # Usage
//!
//! ```no_run
//! use fechadura_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Publishing to: {}", config.device.topic);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::FechaduraConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Parse errors become diagnostics with typo suggestions; validation errors
/// about a specific setting are pointed at the file that set it.
pub fn load_and_validate() -> Result<FechaduraConfig, Vec<ConfigError>> {
    checked(loader::load_config(), collect_toml_sources)
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<FechaduraConfig, Vec<ConfigError>> {
    let config = checked(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<FechaduraConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Validate a loaded config, reading the TOML sources only when an error
/// needs them.
fn checked(
    loaded: Result<FechaduraConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<FechaduraConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => match validation::validate_config(&config) {
            Ok(()) => Ok(config),
            Err(mut errors) => {
                diagnostic::attach_source_spans(&mut errors, &sources());
                Err(errors)
            }
        },
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// TOML files that exist, highest precedence first.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    // Local config
    if let Ok(content) = std::fs::read_to_string("fechadura.toml") {
        let path = std::env::current_dir()
            .map(|d| d.join("fechadura.toml").display().to_string())
            .unwrap_or_else(|_| "fechadura.toml".to_string());
        sources.push((path, content));
    }

    // XDG user config
    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("fechadura/fechadura.toml");
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    // System config
    let system_path = std::path::Path::new("/etc/fechadura/fechadura.toml");
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}
