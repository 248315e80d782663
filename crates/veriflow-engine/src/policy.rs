// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Case creation policy: which interpreted verdicts open a case for human
//! review, and what kind of case they open.

use veriflow_classify::Interpreted;
use veriflow_core::types::{CaseKind, EvidenceLabel, PendingIntent};

/// Whether this turn opens a case. `ACTIVITY`, `REVIEW`, and `SLIP` always
/// do; `OTHER` only when the user had explicitly declared activity intent,
/// since even a low-value image then needs a human's eyes. Plain unsolicited
/// `OTHER` never opens one.
pub fn should_create_case(interpreted: &Interpreted, pending: &PendingIntent) -> bool {
    match interpreted.label {
        EvidenceLabel::Activity | EvidenceLabel::Review | EvidenceLabel::Slip => true,
        EvidenceLabel::Other => pending.is_activity(),
    }
}

/// Case kind for an interpreted verdict. Only a surviving `SLIP` opens a
/// slip case; everything else is queued as activity review.
pub fn case_kind(interpreted: &Interpreted) -> CaseKind {
    match interpreted.label {
        EvidenceLabel::Slip => CaseKind::Slip,
        _ => CaseKind::Activity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn verdict(label: EvidenceLabel) -> Interpreted {
        Interpreted {
            label,
            confidence: 0.5,
        }
    }

    fn pending_activity() -> PendingIntent {
        PendingIntent::PendingActivity {
            since: Utc::now(),
            note: None,
        }
    }

    #[test]
    fn activity_review_and_slip_always_create_cases() {
        for label in [
            EvidenceLabel::Activity,
            EvidenceLabel::Review,
            EvidenceLabel::Slip,
        ] {
            assert!(should_create_case(&verdict(label), &PendingIntent::None));
            assert!(should_create_case(&verdict(label), &pending_activity()));
        }
    }

    #[test]
    fn plain_other_never_creates_a_case() {
        assert!(!should_create_case(
            &verdict(EvidenceLabel::Other),
            &PendingIntent::None
        ));
        assert!(!should_create_case(
            &verdict(EvidenceLabel::Other),
            &PendingIntent::PendingImageQuestion {
                since: Utc::now(),
                note: None,
            }
        ));
    }

    #[test]
    fn other_with_declared_activity_intent_creates_a_case() {
        assert!(should_create_case(
            &verdict(EvidenceLabel::Other),
            &pending_activity()
        ));
    }

    #[test]
    fn only_slip_opens_a_slip_case() {
        assert_eq!(case_kind(&verdict(EvidenceLabel::Slip)), CaseKind::Slip);
        assert_eq!(
            case_kind(&verdict(EvidenceLabel::Activity)),
            CaseKind::Activity
        );
        assert_eq!(
            case_kind(&verdict(EvidenceLabel::Review)),
            CaseKind::Activity
        );
        assert_eq!(case_kind(&verdict(EvidenceLabel::Other)), CaseKind::Activity);
    }
}
