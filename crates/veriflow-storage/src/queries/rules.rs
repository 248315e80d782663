// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign rule lookup and code pool seeding.

use rusqlite::{params, OptionalExtension};

use veriflow_core::VeriflowError;

use crate::database::Database;
use crate::models::CampaignRule;

/// Create a campaign rule for one tenant/bot/day.
pub async fn create_rule(db: &Database, rule: &CampaignRule) -> Result<(), VeriflowError> {
    let rule = rule.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO campaign_rules (id, tenant, bot_id, date_key, name, active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    rule.id,
                    rule.tenant,
                    rule.bot_id,
                    rule.date_key,
                    rule.name,
                    rule.active as i64,
                    rule.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve the active rule for a tenant/bot/day, if any.
///
/// The result is immutable for the duration of a run; callers must not
/// re-resolve mid-allocation.
pub async fn find_rule_for_day(
    db: &Database,
    tenant: &str,
    bot_id: &str,
    date_key: &str,
) -> Result<Option<CampaignRule>, VeriflowError> {
    let tenant = tenant.to_string();
    let bot_id = bot_id.to_string();
    let date_key = date_key.to_string();
    db.connection()
        .call(move |conn| {
            let rule = conn
                .query_row(
                    "SELECT id, tenant, bot_id, date_key, name, active, created_at
                     FROM campaign_rules
                     WHERE tenant = ?1 AND bot_id = ?2 AND date_key = ?3 AND active = 1
                     ORDER BY created_at ASC
                     LIMIT 1",
                    params![tenant, bot_id, date_key],
                    |row| {
                        Ok(CampaignRule {
                            id: row.get(0)?,
                            tenant: row.get(1)?,
                            bot_id: row.get(2)?,
                            date_key: row.get(3)?,
                            name: row.get(4)?,
                            active: row.get::<_, i64>(5)? != 0,
                            created_at: row.get(6)?,
                        })
                    },
                )
                .optional()?;
            Ok(rule)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Load single-use codes into the pool for a rule. Restocking appends; it
/// never touches USED rows.
pub async fn seed_codes(
    db: &Database,
    tenant: &str,
    bot_id: &str,
    rule_id: &str,
    codes: &[String],
) -> Result<(), VeriflowError> {
    let tenant = tenant.to_string();
    let bot_id = bot_id.to_string();
    let rule_id = rule_id.to_string();
    let codes = codes.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO code_pool (tenant, bot_id, rule_id, code)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for code in &codes {
                    stmt.execute(params![tenant, bot_id, rule_id, code])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count the `AVAILABLE` codes remaining for a rule (operator restock signal).
pub async fn available_count(
    db: &Database,
    tenant: &str,
    bot_id: &str,
    rule_id: &str,
) -> Result<i64, VeriflowError> {
    let tenant = tenant.to_string();
    let bot_id = bot_id.to_string();
    let rule_id = rule_id.to_string();
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM code_pool
                 WHERE tenant = ?1 AND bot_id = ?2 AND rule_id = ?3 AND status = 'AVAILABLE'",
                params![tenant, bot_id, rule_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
