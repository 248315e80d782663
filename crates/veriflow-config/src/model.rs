// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Veriflow pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Veriflow configuration.
///
/// Loaded from TOML with environment variable overrides. All sections are
/// optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VeriflowConfig {
    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Verification pipeline policy knobs.
    #[serde(default)]
    pub verify: VerifyConfig,

    /// External vision classifier settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("veriflow").join("veriflow.db"))
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| "veriflow.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Verification pipeline policy configuration.
///
/// These are business policy knobs, not implementation details; every
/// threshold here is owned by the campaign operators.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyConfig {
    /// Minimum confidence for an `ACTIVITY` verdict to auto-issue a reward.
    #[serde(default = "default_confident_pass_threshold")]
    pub confident_pass_threshold: f32,

    /// Hours before a pending intent expires and resets to none.
    #[serde(default = "default_pending_ttl_hours")]
    pub pending_ttl_hours: u64,

    /// Attempts the allocator makes when claim races are lost.
    #[serde(default = "default_claim_attempts")]
    pub claim_attempts: u32,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            confident_pass_threshold: default_confident_pass_threshold(),
            pending_ttl_hours: default_pending_ttl_hours(),
            claim_attempts: default_claim_attempts(),
        }
    }
}

fn default_confident_pass_threshold() -> f32 {
    0.6
}

fn default_pending_ttl_hours() -> u64 {
    12
}

fn default_claim_attempts() -> u32 {
    3
}

/// External vision classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Classifier HTTP endpoint. `None` requires an injected implementation.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// API key sent as a bearer token. `None` sends no authorization header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Seconds to wait for a verdict before degrading to `REVIEW`.
    #[serde(default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_classifier_timeout_secs(),
        }
    }
}

fn default_classifier_timeout_secs() -> u64 {
    20
}
