// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for storage entities.
//!
//! Timestamps are RFC 3339 UTC strings as stored; the pending-intent columns
//! are assembled into the tagged [`PendingIntent`] union by the query layer
//! so TTL math never touches raw columns.

use serde::{Deserialize, Serialize};

use veriflow_core::types::{CaseKind, CaseStatus, EvidenceLabel, PendingIntent};

/// One (tenant, bot, platform, user) conversation and its short-lived state.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: String,
    pub tenant: String,
    pub bot_id: String,
    pub platform: String,
    pub user_id: String,
    pub pending: PendingIntent,
    pub last_image_ref: Option<String>,
    pub last_image_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One received evidence image plus its classification. Created once per
/// inbound image, never mutated.
#[derive(Debug, Clone)]
pub struct EvidenceImage {
    pub id: String,
    pub tenant: String,
    pub bot_id: String,
    pub conversation_id: String,
    pub image_ref: String,
    pub label: EvidenceLabel,
    pub confidence: f32,
    pub reason: Option<String>,
    pub case_id: Option<String>,
    pub created_at: String,
}

/// A human-reviewable case.
#[derive(Debug, Clone)]
pub struct CaseRecord {
    pub id: String,
    pub tenant: String,
    pub bot_id: String,
    pub conversation_id: String,
    pub platform: String,
    pub user_id: String,
    pub kind: CaseKind,
    pub note: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub status: CaseStatus,
    pub needs_attention: bool,
    pub rule_id: Option<String>,
    pub date_key: Option<String>,
    pub image_ref: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// The case fields exposed to the review surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReview {
    pub case_id: String,
    pub kind: CaseKind,
    pub classification: EvidenceLabel,
    pub confidence: f32,
    pub image_ref: Option<String>,
    pub rule_id: Option<String>,
    pub date_key: Option<String>,
    pub status: CaseStatus,
}

/// Identifies which reward pool is active for a tenant/bot/day.
/// Immutable once resolved for a given day.
#[derive(Debug, Clone)]
pub struct CampaignRule {
    pub id: String,
    pub tenant: String,
    pub bot_id: String,
    pub date_key: String,
    pub name: String,
    pub active: bool,
    pub created_at: String,
}

/// A single-use code belonging to exactly one campaign rule.
#[derive(Debug, Clone)]
pub struct CodePoolEntry {
    pub id: i64,
    pub tenant: String,
    pub bot_id: String,
    pub rule_id: String,
    pub code: String,
    pub status: String,
    pub used_at: Option<String>,
    pub used_by: Option<String>,
}

/// Durable proof that a (tenant, bot, user, rule, day) tuple claimed a code.
#[derive(Debug, Clone)]
pub struct Redemption {
    pub id: String,
    pub tenant: String,
    pub bot_id: String,
    pub user_id: String,
    pub rule_id: String,
    pub date_key: String,
    pub code_pool_entry_id: i64,
    pub created_at: String,
}
