// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Veriflow verification pipeline.

use thiserror::Error;

/// The primary error type used across Veriflow crates.
///
/// Turn-level business outcomes (out of stock, already redeemed, no active
/// rule) are NOT errors; they are tagged outcome values. This enum covers
/// infrastructure and input failures only, so nothing here should ever be
/// surfaced to an end user verbatim.
#[derive(Debug, Error)]
pub enum VeriflowError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel delivery errors (platform API failure, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Vision classifier errors (API failure, malformed verdict).
    ///
    /// The turn pipeline never propagates this to the user; it degrades
    /// to a `REVIEW` classification instead.
    #[error("classifier error: {message}")]
    Classifier {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Inbound event rejected before any case or classification work.
    #[error("invalid inbound event: {0}")]
    InvalidInput(String),

    /// Operator referenced a case that does not exist.
    #[error("case not found: {0}")]
    CaseNotFound(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
