// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./fechadura.toml` > `~/.config/fechadura/fechadura.toml` > `/etc/fechadura/fechadura.toml`
//! with environment variable overrides via `FECHADURA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FechaduraConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/fechadura/fechadura.toml` (system-wide)
/// 3. `~/.config/fechadura/fechadura.toml` (user XDG config)
/// 4. `./fechadura.toml` (local directory)
/// 5. `FECHADURA_*` environment variables
pub fn load_config() -> Result<FechaduraConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FechaduraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FechaduraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FechaduraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FechaduraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FechaduraConfig::default()))
        .merge(Toml::file("/etc/fechadura/fechadura.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("fechadura/fechadura.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("fechadura.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `FECHADURA_VAULT_WRAPPED_KEY_NAME`
/// must map to `vault.wrapped_key_name`, not `vault.wrapped.key.name`.
///
/// `FECHADURA_PASSWORD` is read by the password prompt and is filtered out here.
fn env_provider() -> Env {
    Env::prefixed("FECHADURA_")
        .filter(|key| !key.as_str().eq_ignore_ascii_case("password"))
        .map(|key| {
            // `key` is the env var name with prefix stripped.
            // Example: FECHADURA_DEVICE_ENDPOINT -> "device_endpoint"
            let mapped = map_env_key(&key.as_str().to_ascii_lowercase());
            mapped.into()
        })
}

/// Map a lowercased, prefix-stripped env var name to its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 5] = ["device", "vault", "storage", "prompt", "log"];
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section)
            && let Some(field) = rest.strip_prefix('_')
        {
            return format!("{section}.{field}");
        }
    }
    key.to_string()
}
