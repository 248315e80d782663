// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Verdict interpretation with the declared-intent override policy.

use tracing::debug;

use veriflow_core::types::{Classification, EvidenceLabel, PendingIntent};

/// Minimum confidence for an `ACTIVITY` verdict to count as a confident
/// pass. A business policy knob, also exposed through config.
pub const CONFIDENT_PASS_THRESHOLD: f32 = 0.6;

/// Confidence ceiling applied when a `SLIP` verdict is downgraded to
/// `REVIEW` because the conversation declared activity intent.
pub const SLIP_DOWNGRADE_CAP: f32 = 0.6;

/// The interpreted classification: label plus confidence after the override
/// policy has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpreted {
    pub label: EvidenceLabel,
    pub confidence: f32,
}

/// Apply the override policy to a raw verdict.
///
/// When the conversation is in `PendingActivity` and the classifier says
/// `SLIP`, the verdict is downgraded to `REVIEW` with the confidence capped:
/// a legitimate activity photo that superficially resembles a payment slip
/// must reach a human instead of being silently rejected. Every other
/// combination passes through unchanged.
pub fn interpret(raw: &Classification, pending: &PendingIntent) -> Interpreted {
    if pending.is_activity() && raw.label == EvidenceLabel::Slip {
        let confidence = raw.confidence.min(SLIP_DOWNGRADE_CAP);
        debug!(
            raw_confidence = raw.confidence,
            confidence, "SLIP downgraded to REVIEW under declared activity intent"
        );
        return Interpreted {
            label: EvidenceLabel::Review,
            confidence,
        };
    }
    Interpreted {
        label: raw.label,
        confidence: raw.confidence,
    }
}

/// Whether an interpreted verdict qualifies for automatic reward issuance.
pub fn is_confident_pass(interpreted: &Interpreted, threshold: f32) -> bool {
    interpreted.label == EvidenceLabel::Activity && interpreted.confidence >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn raw(label: EvidenceLabel, confidence: f32) -> Classification {
        Classification {
            label,
            confidence,
            reason: "test".into(),
        }
    }

    fn pending_activity() -> PendingIntent {
        PendingIntent::PendingActivity {
            since: Utc::now(),
            note: None,
        }
    }

    #[test]
    fn slip_under_activity_intent_downgrades_to_review() {
        let interpreted = interpret(&raw(EvidenceLabel::Slip, 0.9), &pending_activity());
        assert_eq!(interpreted.label, EvidenceLabel::Review);
        assert!((interpreted.confidence - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn slip_downgrade_keeps_lower_confidence() {
        let interpreted = interpret(&raw(EvidenceLabel::Slip, 0.3), &pending_activity());
        assert_eq!(interpreted.label, EvidenceLabel::Review);
        assert!((interpreted.confidence - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn slip_without_intent_passes_through() {
        let interpreted = interpret(&raw(EvidenceLabel::Slip, 0.9), &PendingIntent::None);
        assert_eq!(interpreted.label, EvidenceLabel::Slip);
        assert!((interpreted.confidence - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn activity_passes_through_under_any_intent() {
        let interpreted = interpret(&raw(EvidenceLabel::Activity, 0.8), &pending_activity());
        assert_eq!(interpreted.label, EvidenceLabel::Activity);
        assert!((interpreted.confidence - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn confident_pass_requires_activity_at_threshold() {
        let threshold = CONFIDENT_PASS_THRESHOLD;
        let pass = Interpreted {
            label: EvidenceLabel::Activity,
            confidence: 0.6,
        };
        assert!(is_confident_pass(&pass, threshold));

        let low = Interpreted {
            label: EvidenceLabel::Activity,
            confidence: 0.59,
        };
        assert!(!is_confident_pass(&low, threshold));

        let review = Interpreted {
            label: EvidenceLabel::Review,
            confidence: 0.99,
        };
        assert!(!is_confident_pass(&review, threshold));
    }
}
