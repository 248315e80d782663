// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Veriflow verification pipeline.
//!
//! Layered TOML + environment configuration built on Figment, with serde
//! models that reject unknown keys at startup.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ClassifierConfig, StorageConfig, VerifyConfig, VeriflowConfig};
