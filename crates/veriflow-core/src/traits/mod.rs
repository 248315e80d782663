// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits at the pipeline's external seams.
//!
//! These are injected once at startup per bot/platform rather than looked up
//! through any shared mutable registry.

pub mod channel;
pub mod classifier;

pub use channel::ChannelSender;
pub use classifier::EvidenceClassifier;
