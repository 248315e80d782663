// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reward code allocation: exactly-once, race-safe claims from a finite pool.
//!
//! The whole redeem runs as one transaction on the single-writer connection:
//! an idempotency probe against the redemptions table, then a bounded
//! optimistic claim over `AVAILABLE` pool rows. The conditional update flips
//! one specific row `AVAILABLE -> USED` only if it is still `AVAILABLE` at
//! write time; a plain read-then-write would let two callers claim the same
//! row between the select and the update.

use rusqlite::{params, OptionalExtension};
use tracing::{debug, warn};

use veriflow_core::claim::{bounded_claim, ClaimAttempt, ClaimOutcome};
use veriflow_core::types::RedeemOutcome;
use veriflow_core::VeriflowError;

use crate::database::Database;

/// The (tenant, bot, user, rule, day) tuple a redemption is keyed by.
#[derive(Debug, Clone)]
pub struct RedeemRequest {
    pub tenant: String,
    pub bot_id: String,
    pub user_id: String,
    pub rule_id: String,
    pub date_key: String,
}

/// Claim one single-use code for the request tuple.
///
/// Idempotent: a tuple that already holds a redemption gets
/// `AlreadyRedeemed` with the original code, never a fresh claim. This
/// covers webhook redeliveries and double-clicked approvals.
pub async fn redeem(
    db: &Database,
    request: RedeemRequest,
    max_attempts: u32,
) -> Result<RedeemOutcome, VeriflowError> {
    let now = chrono::Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            // Step 1: has this exact tuple already claimed a code?
            let existing: Option<String> = tx
                .query_row(
                    "SELECT p.code
                     FROM redemptions r
                     JOIN code_pool p ON p.id = r.code_pool_entry_id
                     WHERE r.tenant = ?1 AND r.bot_id = ?2 AND r.user_id = ?3
                       AND r.rule_id = ?4 AND r.date_key = ?5",
                    params![
                        request.tenant,
                        request.bot_id,
                        request.user_id,
                        request.rule_id,
                        request.date_key,
                    ],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(code) = existing {
                tx.commit()?;
                debug!(user_id = %request.user_id, rule_id = %request.rule_id,
                       "tuple already redeemed, returning original code");
                return Ok(RedeemOutcome::AlreadyRedeemed { code });
            }

            // Step 2: bounded optimistic claim over the oldest AVAILABLE row.
            let outcome = bounded_claim::<_, rusqlite::Error, _>(max_attempts, || {
                let candidate: Option<(i64, String)> = tx
                    .query_row(
                        "SELECT id, code FROM code_pool
                         WHERE tenant = ?1 AND bot_id = ?2 AND rule_id = ?3
                           AND status = 'AVAILABLE'
                         ORDER BY id ASC
                         LIMIT 1",
                        params![request.tenant, request.bot_id, request.rule_id],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;
                let Some((entry_id, code)) = candidate else {
                    return Ok(ClaimAttempt::Empty);
                };

                // Compare-and-swap guard: affects zero rows if another
                // caller claimed this entry since the select.
                let updated = tx.execute(
                    "UPDATE code_pool SET status = 'USED', used_at = ?1, used_by = ?2
                     WHERE id = ?3 AND status = 'AVAILABLE'",
                    params![now, request.user_id, entry_id],
                )?;
                if updated == 1 {
                    Ok(ClaimAttempt::Won((entry_id, code)))
                } else {
                    warn!(entry_id, "claim race lost, retrying next candidate");
                    Ok(ClaimAttempt::Lost)
                }
            })?;

            match outcome {
                ClaimOutcome::Won((entry_id, code)) => {
                    tx.execute(
                        "INSERT INTO redemptions
                         (id, tenant, bot_id, user_id, rule_id, date_key,
                          code_pool_entry_id, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        params![
                            uuid::Uuid::new_v4().to_string(),
                            request.tenant,
                            request.bot_id,
                            request.user_id,
                            request.rule_id,
                            request.date_key,
                            entry_id,
                            now,
                        ],
                    )?;
                    tx.commit()?;
                    debug!(user_id = %request.user_id, entry_id, "code claimed");
                    Ok(RedeemOutcome::Pass { code })
                }
                ClaimOutcome::Empty => {
                    tx.commit()?;
                    warn!(rule_id = %request.rule_id, "reward pool out of stock");
                    Ok(RedeemOutcome::OutOfStock)
                }
                ClaimOutcome::Exhausted => {
                    tx.commit()?;
                    warn!(rule_id = %request.rule_id, max_attempts,
                          "claim attempts exhausted under contention");
                    Ok(RedeemOutcome::RaceExhausted)
                }
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
