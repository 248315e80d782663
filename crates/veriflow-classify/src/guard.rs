// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Never-throw wrapper around the classifier.
//!
//! Downstream policy always needs a defined verdict: a failed or slow
//! classifier degrades to `{REVIEW, 0}` rather than leaving the turn
//! unresolved or retrying indefinitely.

use std::time::Duration;

use tracing::warn;

use veriflow_core::types::{Classification, EvidenceLabel};
use veriflow_core::EvidenceClassifier;

/// Reason reported when the classifier could not produce a verdict.
pub const CLASSIFIER_UNAVAILABLE: &str = "classifier_unavailable";

/// Classify with a hard timeout, degrading every failure to `REVIEW`.
///
/// Confidence is clamped to `[0, 1]` on the way through; classifiers are
/// external and not trusted to stay in range.
pub async fn classify_or_review(
    classifier: &dyn EvidenceClassifier,
    image_ref: &str,
    caption: &str,
    timeout: Duration,
) -> Classification {
    match tokio::time::timeout(timeout, classifier.classify(image_ref, caption)).await {
        Ok(Ok(mut verdict)) => {
            verdict.confidence = verdict.confidence.clamp(0.0, 1.0);
            verdict
        }
        Ok(Err(e)) => {
            warn!(error = %e, "classifier failed, degrading to REVIEW");
            review_fallback()
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "classifier timed out, degrading to REVIEW");
            review_fallback()
        }
    }
}

fn review_fallback() -> Classification {
    Classification {
        label: EvidenceLabel::Review,
        confidence: 0.0,
        reason: CLASSIFIER_UNAVAILABLE.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use veriflow_core::VeriflowError;

    struct FixedClassifier(Classification);

    #[async_trait]
    impl EvidenceClassifier for FixedClassifier {
        async fn classify(&self, _: &str, _: &str) -> Result<Classification, VeriflowError> {
            Ok(self.0.clone())
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl EvidenceClassifier for FailingClassifier {
        async fn classify(&self, _: &str, _: &str) -> Result<Classification, VeriflowError> {
            Err(VeriflowError::Classifier {
                message: "backend down".into(),
                source: None,
            })
        }
    }

    struct SlowClassifier;

    #[async_trait]
    impl EvidenceClassifier for SlowClassifier {
        async fn classify(&self, _: &str, _: &str) -> Result<Classification, VeriflowError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            unreachable!("the wrapper must time out first")
        }
    }

    #[tokio::test]
    async fn healthy_verdict_passes_through() {
        let classifier = FixedClassifier(Classification {
            label: EvidenceLabel::Activity,
            confidence: 0.8,
            reason: "ok".into(),
        });
        let verdict =
            classify_or_review(&classifier, "img://1", "", Duration::from_secs(1)).await;
        assert_eq!(verdict.label, EvidenceLabel::Activity);
        assert!((verdict.confidence - 0.8).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_clamped() {
        let classifier = FixedClassifier(Classification {
            label: EvidenceLabel::Slip,
            confidence: 1.7,
            reason: "overconfident".into(),
        });
        let verdict =
            classify_or_review(&classifier, "img://1", "", Duration::from_secs(1)).await;
        assert!((verdict.confidence - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn failure_degrades_to_review() {
        let verdict =
            classify_or_review(&FailingClassifier, "img://1", "", Duration::from_secs(1)).await;
        assert_eq!(verdict.label, EvidenceLabel::Review);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.reason, CLASSIFIER_UNAVAILABLE);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_degrades_to_review() {
        let verdict =
            classify_or_review(&SlowClassifier, "img://1", "", Duration::from_secs(5)).await;
        assert_eq!(verdict.label, EvidenceLabel::Review);
        assert_eq!(verdict.reason, CLASSIFIER_UNAVAILABLE);
    }
}
