// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types shared across the Veriflow workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifies one conversation: one user talking to one bot on one platform,
/// scoped to a tenant. All pending-intent state hangs off this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    pub tenant: String,
    pub bot_id: String,
    pub platform: String,
    pub user_id: String,
}

impl ConversationKey {
    /// Canonical string form, used as the per-conversation lock key.
    pub fn lock_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.tenant, self.bot_id, self.platform, self.user_id
        )
    }
}

/// Inbound evidence event, already authenticated and deduplicated by the
/// transport layer upstream of this pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceEvent {
    pub tenant: String,
    pub bot_id: String,
    pub platform: String,
    pub user_id: String,
    pub conversation_id: String,
    pub image_ref: String,
    pub caption_text: String,
    pub request_id: String,
}

impl EvidenceEvent {
    pub fn conversation_key(&self) -> ConversationKey {
        ConversationKey {
            tenant: self.tenant.clone(),
            bot_id: self.bot_id.clone(),
            platform: self.platform.clone(),
            user_id: self.user_id.clone(),
        }
    }
}

/// Verdict labels produced by the vision classifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EvidenceLabel {
    /// A photo showing the promotional activity was completed.
    Activity,
    /// A payment slip.
    Slip,
    /// Anything else.
    Other,
    /// Classifier could not decide; a human should look.
    Review,
}

/// Raw classifier verdict for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub label: EvidenceLabel,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
    pub reason: String,
}

/// What kind of evidence a conversation is expected to submit next.
///
/// Short-lived, tagged state: the `since` timestamp drives TTL expiry, which
/// is applied once per turn on first read rather than inline at call sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingIntent {
    /// Nothing expected.
    None,
    /// User said they want to submit activity evidence.
    PendingActivity {
        since: DateTime<Utc>,
        note: Option<String>,
    },
    /// User was invited to ask a question about an image or promo.
    PendingImageQuestion {
        since: DateTime<Utc>,
        note: Option<String>,
    },
}

impl PendingIntent {
    pub fn is_none(&self) -> bool {
        matches!(self, PendingIntent::None)
    }

    pub fn is_activity(&self) -> bool {
        matches!(self, PendingIntent::PendingActivity { .. })
    }

    pub fn is_image_question(&self) -> bool {
        matches!(self, PendingIntent::PendingImageQuestion { .. })
    }

    /// When the pending state was set, if any.
    pub fn since(&self) -> Option<DateTime<Utc>> {
        match self {
            PendingIntent::None => None,
            PendingIntent::PendingActivity { since, .. }
            | PendingIntent::PendingImageQuestion { since, .. } => Some(*since),
        }
    }
}

/// Kind of a human-reviewable case.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    Activity,
    Slip,
}

/// Lifecycle of a case: `Open -> Approved | Rejected | AutoResolved`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    Approved,
    Rejected,
    AutoResolved,
}

/// Outcome of one allocator call. `OutOfStock` and `RaceExhausted` are
/// distinct so callers can message users and alert operators differently:
/// genuinely empty pool vs. transient contention worth a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// A fresh code was claimed for this tuple.
    Pass { code: String },
    /// The tuple already holds a redemption; the original code is returned.
    AlreadyRedeemed { code: String },
    /// No `AVAILABLE` entry remains in the pool.
    OutOfStock,
    /// Stock existed but every claim attempt lost the race.
    RaceExhausted,
}

/// Outcome of an approval-gateway call: allocator outcomes plus the
/// "no active campaign rule today" case resolved before allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationOutcome {
    Pass { code: String },
    AlreadyRedeemed { code: String },
    OutOfStock,
    RaceExhausted,
    NoRuleToday,
}

impl From<RedeemOutcome> for AllocationOutcome {
    fn from(value: RedeemOutcome) -> Self {
        match value {
            RedeemOutcome::Pass { code } => AllocationOutcome::Pass { code },
            RedeemOutcome::AlreadyRedeemed { code } => {
                AllocationOutcome::AlreadyRedeemed { code }
            }
            RedeemOutcome::OutOfStock => AllocationOutcome::OutOfStock,
            RedeemOutcome::RaceExhausted => AllocationOutcome::RaceExhausted,
        }
    }
}

/// Date key used to scope redemptions to one campaign day (`YYYY-MM-DD`, UTC).
pub fn date_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}
