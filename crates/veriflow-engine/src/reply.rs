// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing reply text. Deterministic per outcome so transcripts and
//! tests can assert on content; copy changes happen here and nowhere else.

use veriflow_core::types::AllocationOutcome;

/// Reply for an allocation attempt, automatic or operator-approved.
pub fn for_allocation(outcome: &AllocationOutcome) -> String {
    match outcome {
        AllocationOutcome::Pass { code } => format!(
            "Your activity has been verified! Here is your reward code: {code}"
        ),
        AllocationOutcome::AlreadyRedeemed { code } => format!(
            "You have already received your reward for today. Your code is: {code}"
        ),
        AllocationOutcome::OutOfStock => {
            "Today's reward codes have all been claimed. We are restocking soon — \
             your submission is verified and you will be notified."
                .to_string()
        }
        AllocationOutcome::RaceExhausted => {
            "We could not reserve a code just now due to high demand. \
             Please resubmit shortly."
                .to_string()
        }
        AllocationOutcome::NoRuleToday => {
            "Thanks! Your submission is received and still being verified. \
             We will get back to you soon."
                .to_string()
        }
    }
}

/// Declared activity intent but the photo could not be confirmed.
pub fn clearer_activity_photo() -> String {
    "We could not confirm this as an activity photo. Could you send a clearer \
     photo of the completed activity?"
        .to_string()
}

/// Evidence queued for human review.
pub fn sent_for_review() -> String {
    "Thanks! Your submission has been sent for review. We will get back to you \
     soon."
        .to_string()
}

/// A payment slip arrived.
pub fn slip_received() -> String {
    "We received your payment slip. Our team will review it and follow up with \
     you shortly."
        .to_string()
}

/// Unsolicited image with no declared intent: invite a question.
pub fn photo_invitation() -> String {
    "Nice photo! If you have a question about it or about one of our \
     promotions, just ask."
        .to_string()
}

/// Operator rejected the case.
pub fn rejected() -> String {
    "Unfortunately we could not verify your submission this time. Feel free to \
     try again with another photo."
        .to_string()
}
