// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Veriflow verification pipeline.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed query modules for
//! conversations, evidence images, cases, campaign rules, and the race-safe
//! reward code pool.
//!
//! The allocator in [`queries::pool`] must only be invoked through the
//! approval gateway in `veriflow-engine`; both the automatic confident-pass
//! path and human approvals funnel through that single entry point.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::*;
