// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Veriflow evidence-verification pipeline.
//!
//! This crate provides the foundational types, error taxonomy, capability
//! traits, and the bounded optimistic-claim abstraction used throughout the
//! Veriflow workspace.

pub mod claim;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use claim::{bounded_claim, ClaimAttempt, ClaimOutcome};
pub use error::VeriflowError;
pub use traits::{ChannelSender, EvidenceClassifier};
pub use types::{
    AllocationOutcome, CaseKind, CaseStatus, Classification, ConversationKey, EvidenceEvent,
    EvidenceLabel, PendingIntent, RedeemOutcome,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn veriflow_error_has_all_variants() {
        let _config = VeriflowError::Config("test".into());
        let _storage = VeriflowError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = VeriflowError::Channel {
            message: "test".into(),
            source: None,
        };
        let _classifier = VeriflowError::Classifier {
            message: "test".into(),
            source: None,
        };
        let _invalid = VeriflowError::InvalidInput("missing image ref".into());
        let _not_found = VeriflowError::CaseNotFound("case-1".into());
        let _timeout = VeriflowError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = VeriflowError::Internal("test".into());
    }

    #[test]
    fn error_messages_carry_detail() {
        let err = VeriflowError::InvalidInput("missing image ref".into());
        assert_eq!(err.to_string(), "invalid inbound event: missing image ref");

        let err = VeriflowError::CaseNotFound("case-42".into());
        assert_eq!(err.to_string(), "case not found: case-42");
    }

    #[test]
    fn capability_traits_are_object_safe() {
        fn _assert_sender(_: &dyn ChannelSender) {}
        fn _assert_classifier(_: &dyn EvidenceClassifier) {}
    }
}
