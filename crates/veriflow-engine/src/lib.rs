// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The verification engine: one inbound evidence image in, one resolved turn
//! out. Orchestrates intent tracking, classification, case policy, reward
//! allocation, and the user-facing reply, plus the operator review surface.
//!
//! Concurrency model: turns for the same conversation serialize on a
//! per-conversation mutex (the read/expire/write sequence on pending intent
//! is a critical section); turns for different conversations run freely. The
//! allocator coordinates cross-request contention itself, row by row.

pub mod gateway;
pub mod intent;
pub mod policy;
pub mod reply;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use veriflow_classify::{classify_or_review, interpret, is_confident_pass};
use veriflow_config::VeriflowConfig;
use veriflow_core::types::{
    date_key, AllocationOutcome, CaseStatus, ConversationKey, EvidenceEvent, EvidenceLabel,
    PendingIntent,
};
use veriflow_core::{ChannelSender, EvidenceClassifier, VeriflowError};
use veriflow_storage::models::{CaseRecord, CaseReview, EvidenceImage};
use veriflow_storage::queries::{cases, conversations, evidence};
use veriflow_storage::Database;

use gateway::{ApprovalGateway, ApprovalResult, ApprovalTicket};

/// Everything one turn resolved to, for callers and transcripts.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub case_id: Option<String>,
    pub label: EvidenceLabel,
    pub confidence: f32,
    pub allocation: Option<AllocationOutcome>,
}

/// Result of an operator decision on a case.
#[derive(Debug, Clone)]
pub struct CaseDecision {
    pub reply: String,
    pub outcome: AllocationOutcome,
}

pub struct VerifyEngine {
    db: Database,
    classifier: Arc<dyn EvidenceClassifier>,
    sender: Arc<dyn ChannelSender>,
    confident_pass_threshold: f32,
    pending_ttl: Duration,
    classifier_timeout: StdDuration,
    gateway: ApprovalGateway,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl VerifyEngine {
    pub fn new(
        db: Database,
        classifier: Arc<dyn EvidenceClassifier>,
        sender: Arc<dyn ChannelSender>,
        config: &VeriflowConfig,
    ) -> Self {
        let gateway = ApprovalGateway::new(db.clone(), config.verify.claim_attempts);
        Self {
            db,
            classifier,
            sender,
            confident_pass_threshold: config.verify.confident_pass_threshold,
            pending_ttl: Duration::hours(config.verify.pending_ttl_hours as i64),
            classifier_timeout: StdDuration::from_secs(config.classifier.timeout_secs),
            gateway,
            locks: DashMap::new(),
        }
    }

    fn conversation_lock(&self, key: &ConversationKey) -> Arc<Mutex<()>> {
        self.locks.entry(key.lock_key()).or_default().value().clone()
    }

    /// Handle one inbound evidence image end to end: intent, classification,
    /// case policy, allocation (when the turn is a confident pass under
    /// declared activity intent), and the user-facing reply.
    pub async fn handle_evidence(&self, event: EvidenceEvent) -> Result<TurnOutcome, VeriflowError> {
        if event.image_ref.trim().is_empty() {
            return Err(VeriflowError::InvalidInput(
                "evidence event carries no image reference".into(),
            ));
        }

        let key = event.conversation_key();
        let lock = self.conversation_lock(&key);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let (conversation, pending) = intent::read(&self.db, &key, self.pending_ttl, now).await?;
        let pending =
            intent::apply_text(&self.db, &key, &event.caption_text, &pending, now).await?;
        conversations::record_last_image(&self.db, &key, &event.image_ref, now).await?;

        let raw = classify_or_review(
            self.classifier.as_ref(),
            &event.image_ref,
            &event.caption_text,
            self.classifier_timeout,
        )
        .await;
        let interpreted = interpret(&raw, &pending);
        let passed = is_confident_pass(&interpreted, self.confident_pass_threshold);
        debug!(
            raw_label = %raw.label,
            label = %interpreted.label,
            confidence = interpreted.confidence,
            passed,
            "evidence interpreted"
        );

        let mut case_id = None;
        if policy::should_create_case(&interpreted, &pending) {
            let case = CaseRecord {
                id: uuid::Uuid::new_v4().to_string(),
                tenant: event.tenant.clone(),
                bot_id: event.bot_id.clone(),
                conversation_id: conversation.id.clone(),
                platform: event.platform.clone(),
                user_id: event.user_id.clone(),
                kind: policy::case_kind(&interpreted),
                note: (!event.caption_text.trim().is_empty())
                    .then(|| event.caption_text.clone()),
                metadata: Some(serde_json::json!({
                    "raw": {
                        "label": raw.label.to_string(),
                        "confidence": raw.confidence,
                        "reason": raw.reason,
                    },
                    "label": interpreted.label.to_string(),
                    "confidence": interpreted.confidence,
                    "passed": passed,
                })),
                status: CaseStatus::Open,
                needs_attention: false,
                rule_id: None,
                date_key: Some(date_key(now)),
                image_ref: Some(event.image_ref.clone()),
                created_at: now.to_rfc3339(),
                updated_at: now.to_rfc3339(),
            };
            cases::create(&self.db, &case).await?;
            info!(case_id = %case.id, kind = %case.kind, "case opened");
            case_id = Some(case.id);
        }

        evidence::insert(
            &self.db,
            &EvidenceImage {
                id: uuid::Uuid::new_v4().to_string(),
                tenant: event.tenant.clone(),
                bot_id: event.bot_id.clone(),
                conversation_id: conversation.id.clone(),
                image_ref: event.image_ref.clone(),
                label: interpreted.label,
                confidence: interpreted.confidence,
                reason: Some(raw.reason.clone()),
                case_id: case_id.clone(),
                created_at: now.to_rfc3339(),
            },
        )
        .await?;

        let mut allocation = None;
        let text = if passed && pending.is_activity() {
            let result = self
                .gateway
                .approve(&ApprovalTicket {
                    tenant: event.tenant.clone(),
                    bot_id: event.bot_id.clone(),
                    user_id: event.user_id.clone(),
                    date_key: date_key(now),
                })
                .await?;
            self.settle_case(case_id.as_deref(), CaseStatus::AutoResolved, &result)
                .await?;
            if matches!(
                result.outcome,
                AllocationOutcome::Pass { .. } | AllocationOutcome::AlreadyRedeemed { .. }
            ) {
                conversations::write_pending(&self.db, &key, &PendingIntent::None).await?;
            }
            let text = reply::for_allocation(&result.outcome);
            allocation = Some(result.outcome);
            text
        } else {
            match interpreted.label {
                EvidenceLabel::Review if pending.is_activity() => reply::clearer_activity_photo(),
                EvidenceLabel::Activity | EvidenceLabel::Review => reply::sent_for_review(),
                EvidenceLabel::Slip => reply::slip_received(),
                EvidenceLabel::Other if pending.is_activity() => reply::sent_for_review(),
                EvidenceLabel::Other => {
                    conversations::write_pending(
                        &self.db,
                        &key,
                        &PendingIntent::PendingImageQuestion {
                            since: now,
                            note: None,
                        },
                    )
                    .await?;
                    reply::photo_invitation()
                }
            }
        };

        self.sender.send_text(&key, &text).await?;
        Ok(TurnOutcome {
            reply: text,
            case_id,
            label: interpreted.label,
            confidence: interpreted.confidence,
            allocation,
        })
    }

    /// Operator approves an open case: resolve the rule, claim a code,
    /// record the decision, notify the user.
    pub async fn approve_case(&self, case_id: &str) -> Result<CaseDecision, VeriflowError> {
        let case = cases::get(&self.db, case_id)
            .await?
            .ok_or_else(|| VeriflowError::CaseNotFound(case_id.to_string()))?;
        if case.status != CaseStatus::Open {
            return Err(VeriflowError::InvalidInput(format!(
                "case {case_id} is {} and cannot be approved",
                case.status
            )));
        }

        let ticket = ApprovalTicket {
            tenant: case.tenant.clone(),
            bot_id: case.bot_id.clone(),
            user_id: case.user_id.clone(),
            date_key: case
                .date_key
                .clone()
                .unwrap_or_else(|| date_key(Utc::now())),
        };
        let result = self.gateway.approve(&ticket).await?;
        self.settle_case(Some(case_id), CaseStatus::Approved, &result)
            .await?;

        let key = ConversationKey {
            tenant: case.tenant,
            bot_id: case.bot_id,
            platform: case.platform,
            user_id: case.user_id,
        };
        if matches!(
            result.outcome,
            AllocationOutcome::Pass { .. } | AllocationOutcome::AlreadyRedeemed { .. }
        ) {
            conversations::write_pending(&self.db, &key, &PendingIntent::None).await?;
        }

        let text = reply::for_allocation(&result.outcome);
        self.sender.send_text(&key, &text).await?;
        Ok(CaseDecision {
            reply: text,
            outcome: result.outcome,
        })
    }

    /// Operator rejects an open case; the user is told the submission did
    /// not verify.
    pub async fn reject_case(&self, case_id: &str) -> Result<String, VeriflowError> {
        let case = cases::get(&self.db, case_id)
            .await?
            .ok_or_else(|| VeriflowError::CaseNotFound(case_id.to_string()))?;
        if case.status != CaseStatus::Open {
            return Err(VeriflowError::InvalidInput(format!(
                "case {case_id} is {} and cannot be rejected",
                case.status
            )));
        }

        cases::record_decision(
            &self.db,
            case_id,
            CaseStatus::Rejected,
            serde_json::json!({ "decision": "rejected" }),
        )
        .await?;

        let key = ConversationKey {
            tenant: case.tenant,
            bot_id: case.bot_id,
            platform: case.platform,
            user_id: case.user_id,
        };
        let text = reply::rejected();
        self.sender.send_text(&key, &text).await?;
        Ok(text)
    }

    /// Review queue for a tenant/bot, oldest first.
    pub async fn list_open_cases(
        &self,
        tenant: &str,
        bot_id: &str,
    ) -> Result<Vec<CaseReview>, VeriflowError> {
        let records = cases::list_open(&self.db, tenant, bot_id).await?;
        Ok(records.iter().map(case_to_review).collect())
    }

    /// Record the allocation result on the case. A successful claim settles
    /// the case with audit metadata; `NoRuleToday` and `OutOfStock` leave it
    /// open and flag it for operator attention (rule missing, pool empty);
    /// `RaceExhausted` leaves it open for a plain retry.
    async fn settle_case(
        &self,
        case_id: Option<&str>,
        resolved_status: CaseStatus,
        result: &ApprovalResult,
    ) -> Result<(), VeriflowError> {
        let Some(case_id) = case_id else {
            return Ok(());
        };
        match &result.outcome {
            AllocationOutcome::Pass { code }
            | AllocationOutcome::AlreadyRedeemed { code } => {
                cases::record_decision(
                    &self.db,
                    case_id,
                    resolved_status,
                    serde_json::json!({
                        "code": code,
                        "rule_id": result.rule_id,
                    }),
                )
                .await
            }
            AllocationOutcome::NoRuleToday | AllocationOutcome::OutOfStock => {
                cases::flag_attention(&self.db, case_id).await
            }
            AllocationOutcome::RaceExhausted => Ok(()),
        }
    }
}

/// Project a stored case onto the review surface, pulling the interpreted
/// classification back out of the audit metadata.
fn case_to_review(case: &CaseRecord) -> CaseReview {
    let metadata = case.metadata.as_ref();
    let classification = metadata
        .and_then(|m| m.get("label"))
        .and_then(|v| v.as_str())
        .and_then(|s| EvidenceLabel::from_str(s).ok())
        .unwrap_or(EvidenceLabel::Review);
    let confidence = metadata
        .and_then(|m| m.get("confidence"))
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0) as f32;
    CaseReview {
        case_id: case.id.clone(),
        kind: case.kind,
        classification,
        confidence,
        image_ref: case.image_ref.clone(),
        rule_id: case.rule_id.clone(),
        date_key: case.date_key.clone(),
        status: case.status,
    }
}
