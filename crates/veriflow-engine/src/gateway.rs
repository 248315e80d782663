// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unified approval gateway.
//!
//! Every reward issuance — automatic confident-pass or operator approval —
//! goes through [`ApprovalGateway::approve`]. Nothing else may call the
//! allocator: the gateway is where the day's campaign rule is resolved, and
//! bypassing it would allow a redemption against a stale or missing rule.

use tracing::{info, warn};

use veriflow_core::types::AllocationOutcome;
use veriflow_core::VeriflowError;

use veriflow_storage::queries::{pool, pool::RedeemRequest, rules};
use veriflow_storage::Database;

/// One approval request: who is being rewarded, on which campaign day.
#[derive(Debug, Clone)]
pub struct ApprovalTicket {
    pub tenant: String,
    pub bot_id: String,
    pub user_id: String,
    pub date_key: String,
}

/// Result of an approval: the allocation outcome plus the rule it resolved
/// to, for case audit metadata. `rule_id` is `None` only for `NoRuleToday`.
#[derive(Debug, Clone)]
pub struct ApprovalResult {
    pub outcome: AllocationOutcome,
    pub rule_id: Option<String>,
}

pub struct ApprovalGateway {
    db: Database,
    claim_attempts: u32,
}

impl ApprovalGateway {
    pub fn new(db: Database, claim_attempts: u32) -> Self {
        Self { db, claim_attempts }
    }

    /// Resolve the active campaign rule for the ticket's day, then claim a
    /// code from its pool. Idempotent per (tenant, bot, user, rule, day).
    pub async fn approve(&self, ticket: &ApprovalTicket) -> Result<ApprovalResult, VeriflowError> {
        let rule = rules::find_rule_for_day(
            &self.db,
            &ticket.tenant,
            &ticket.bot_id,
            &ticket.date_key,
        )
        .await?;

        let Some(rule) = rule else {
            warn!(
                tenant = %ticket.tenant,
                bot_id = %ticket.bot_id,
                date_key = %ticket.date_key,
                "no active campaign rule for day, cannot allocate"
            );
            return Ok(ApprovalResult {
                outcome: AllocationOutcome::NoRuleToday,
                rule_id: None,
            });
        };

        let outcome = pool::redeem(
            &self.db,
            RedeemRequest {
                tenant: ticket.tenant.clone(),
                bot_id: ticket.bot_id.clone(),
                user_id: ticket.user_id.clone(),
                rule_id: rule.id.clone(),
                date_key: ticket.date_key.clone(),
            },
            self.claim_attempts,
        )
        .await?;

        info!(
            rule_id = %rule.id,
            user_id = %ticket.user_id,
            outcome = ?outcome,
            "approval processed"
        );
        Ok(ApprovalResult {
            outcome: outcome.into(),
            rule_id: Some(rule.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use veriflow_storage::models::CampaignRule;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn seed_rule(db: &Database, date_key: &str, codes: &[&str]) -> String {
        let rule = CampaignRule {
            id: "rule-1".into(),
            tenant: "t1".into(),
            bot_id: "b1".into(),
            date_key: date_key.into(),
            name: "daily".into(),
            active: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        rules::create_rule(db, &rule).await.unwrap();
        let codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        rules::seed_codes(db, "t1", "b1", &rule.id, &codes).await.unwrap();
        rule.id
    }

    fn ticket(user: &str, date_key: &str) -> ApprovalTicket {
        ApprovalTicket {
            tenant: "t1".into(),
            bot_id: "b1".into(),
            user_id: user.into(),
            date_key: date_key.into(),
        }
    }

    #[tokio::test]
    async fn no_rule_for_day_short_circuits() {
        let (db, _dir) = setup_db().await;
        let gateway = ApprovalGateway::new(db.clone(), 3);

        let result = gateway.approve(&ticket("u1", "2026-03-01")).await.unwrap();
        assert_eq!(result.outcome, AllocationOutcome::NoRuleToday);
        assert!(result.rule_id.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn approve_claims_a_code_and_reports_the_rule() {
        let (db, _dir) = setup_db().await;
        let rule_id = seed_rule(&db, "2026-03-01", &["AAA", "BBB"]).await;
        let gateway = ApprovalGateway::new(db.clone(), 3);

        let result = gateway.approve(&ticket("u1", "2026-03-01")).await.unwrap();
        assert_eq!(
            result.outcome,
            AllocationOutcome::Pass { code: "AAA".into() }
        );
        assert_eq!(result.rule_id.as_deref(), Some(rule_id.as_str()));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn repeated_approval_is_idempotent() {
        let (db, _dir) = setup_db().await;
        seed_rule(&db, "2026-03-01", &["AAA", "BBB"]).await;
        let gateway = ApprovalGateway::new(db.clone(), 3);

        let first = gateway.approve(&ticket("u1", "2026-03-01")).await.unwrap();
        let second = gateway.approve(&ticket("u1", "2026-03-01")).await.unwrap();
        assert_eq!(
            first.outcome,
            AllocationOutcome::Pass { code: "AAA".into() }
        );
        assert_eq!(
            second.outcome,
            AllocationOutcome::AlreadyRedeemed { code: "AAA".into() }
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn empty_pool_is_out_of_stock() {
        let (db, _dir) = setup_db().await;
        seed_rule(&db, "2026-03-01", &[]).await;
        let gateway = ApprovalGateway::new(db.clone(), 3);

        let result = gateway.approve(&ticket("u1", "2026-03-01")).await.unwrap();
        assert_eq!(result.outcome, AllocationOutcome::OutOfStock);
        assert!(result.rule_id.is_some());

        db.close().await.unwrap();
    }
}
