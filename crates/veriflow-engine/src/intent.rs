// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending-intent tracking: keyword detection and TTL expiry.
//!
//! The expiry check runs exactly once per turn, on first read, and persists
//! the reset; no other code does TTL math.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use veriflow_core::types::{ConversationKey, PendingIntent};
use veriflow_core::VeriflowError;

use veriflow_storage::models::Conversation;
use veriflow_storage::queries::conversations;
use veriflow_storage::Database;

/// Utterances declaring "I want to submit activity evidence"
/// (contains, case-insensitive).
const ACTIVITY_KEYWORDS: &[&str] = &[
    "submit activity",
    "submit my activity",
    "send activity",
    "send my activity",
    "activity photo",
    "activity proof",
    "activity evidence",
    "completed the activity",
    "finished the activity",
    "join the activity",
];

/// Utterances declaring "I have a question about an image/promo"
/// (contains, case-insensitive).
const IMAGE_QUESTION_KEYWORDS: &[&str] = &[
    "question about the photo",
    "question about the image",
    "question about the promo",
    "ask about the photo",
    "ask about the image",
    "ask about the promo",
    "what is this picture",
    "what is this image",
];

/// Intent declared by a single utterance, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredIntent {
    Activity,
    ImageQuestion,
}

/// Scan free text for a declared intent. Activity takes priority when both
/// keyword families match; unknown text declares nothing.
pub fn detect_intent(text: &str) -> Option<DeclaredIntent> {
    let lower = text.to_lowercase();
    if ACTIVITY_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(DeclaredIntent::Activity);
    }
    if IMAGE_QUESTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(DeclaredIntent::ImageQuestion);
    }
    None
}

/// Read the conversation's pending intent, applying TTL expiry as a side
/// effect: the first read after `now - since > ttl` persists the reset and
/// returns `None`. Creates the conversation row if absent.
pub async fn read(
    db: &Database,
    key: &ConversationKey,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<(Conversation, PendingIntent), VeriflowError> {
    let conversation = conversations::get_or_create(db, key, now).await?;
    match conversation.pending.since() {
        Some(since) if now - since > ttl => {
            debug!(key = %key.lock_key(), "pending intent expired, resetting");
            conversations::write_pending(db, key, &PendingIntent::None).await?;
            Ok((conversation, PendingIntent::None))
        }
        _ => {
            let pending = conversation.pending.clone();
            Ok((conversation, pending))
        }
    }
}

/// Apply an utterance to the pending state and persist any change.
///
/// Activity intent always wins; an image-question utterance never demotes an
/// already-declared activity intent. Unknown text leaves state unchanged.
pub async fn apply_text(
    db: &Database,
    key: &ConversationKey,
    text: &str,
    current: &PendingIntent,
    now: DateTime<Utc>,
) -> Result<PendingIntent, VeriflowError> {
    let updated = match detect_intent(text) {
        Some(DeclaredIntent::Activity) => PendingIntent::PendingActivity {
            since: now,
            note: Some(text.to_string()),
        },
        Some(DeclaredIntent::ImageQuestion) if !current.is_activity() => {
            PendingIntent::PendingImageQuestion {
                since: now,
                note: Some(text.to_string()),
            }
        }
        _ => return Ok(current.clone()),
    };
    conversations::write_pending(db, key, &updated).await?;
    Ok(updated)
}
