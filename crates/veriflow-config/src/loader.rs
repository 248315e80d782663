// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./veriflow.toml` > `~/.config/veriflow/veriflow.toml`
//! > `/etc/veriflow/veriflow.toml` with environment variable overrides via
//! `VERIFLOW_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::VeriflowConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/veriflow/veriflow.toml` (system-wide)
/// 3. `~/.config/veriflow/veriflow.toml` (user XDG config)
/// 4. `./veriflow.toml` (local directory)
/// 5. `VERIFLOW_*` environment variables
pub fn load_config() -> Result<VeriflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VeriflowConfig::default()))
        .merge(Toml::file("/etc/veriflow/veriflow.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("veriflow/veriflow.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("veriflow.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<VeriflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VeriflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VeriflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VeriflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `VERIFLOW_STORAGE_DATABASE_PATH` must
/// map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("VERIFLOW_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("storage_", "storage.", 1)
            .replacen("verify_", "verify.", 1)
            .replacen("classifier_", "classifier.", 1);
        mapped.into()
    })
}
