// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Case CRUD and decision recording.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension};

use veriflow_core::types::{CaseKind, CaseStatus};
use veriflow_core::VeriflowError;

use crate::database::Database;
use crate::models::CaseRecord;

/// Insert a new case (always `open`).
pub async fn create(db: &Database, case: &CaseRecord) -> Result<(), VeriflowError> {
    let case = case.clone();
    let metadata = serialize_metadata(&case.metadata)?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO cases
                 (id, tenant, bot_id, conversation_id, platform, user_id, kind, note,
                  metadata, status, needs_attention, rule_id, date_key, image_ref,
                  created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    case.id,
                    case.tenant,
                    case.bot_id,
                    case.conversation_id,
                    case.platform,
                    case.user_id,
                    case.kind.to_string(),
                    case.note,
                    metadata,
                    case.status.to_string(),
                    case.needs_attention as i64,
                    case.rule_id,
                    case.date_key,
                    case.image_ref,
                    case.created_at,
                    case.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one case by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<CaseRecord>, VeriflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let row = conn
                .query_row(
                    &format!("{SELECT_CASE} WHERE id = ?1"),
                    params![id],
                    map_row,
                )
                .optional()?;
            Ok(row)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List open cases for a tenant/bot, oldest first (review queue order).
pub async fn list_open(
    db: &Database,
    tenant: &str,
    bot_id: &str,
) -> Result<Vec<CaseRecord>, VeriflowError> {
    let tenant = tenant.to_string();
    let bot_id = bot_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_CASE} WHERE tenant = ?1 AND bot_id = ?2 AND status = 'open'
                 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![tenant, bot_id], map_row)?;
            let mut cases = Vec::new();
            for row in rows {
                cases.push(row?);
            }
            Ok(cases)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a lifecycle decision on a case, shallow-merging `patch` into the
/// stored metadata object for auditability.
pub async fn record_decision(
    db: &Database,
    id: &str,
    status: CaseStatus,
    patch: serde_json::Value,
) -> Result<(), VeriflowError> {
    let id = id.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT metadata FROM cases WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?
                .flatten();

            let mut merged = existing
                .as_deref()
                .and_then(|s| serde_json::from_str::<serde_json::Value>(s).ok())
                .unwrap_or_else(|| serde_json::json!({}));
            if let (Some(target), Some(source)) = (merged.as_object_mut(), patch.as_object()) {
                for (k, v) in source {
                    target.insert(k.clone(), v.clone());
                }
            }

            conn.execute(
                "UPDATE cases SET status = ?1, metadata = ?2,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?3",
                params![status, merged.to_string(), id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flag a case for operator attention (e.g. no active campaign rule).
pub async fn flag_attention(db: &Database, id: &str) -> Result<(), VeriflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE cases SET needs_attention = 1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

const SELECT_CASE: &str = "SELECT id, tenant, bot_id, conversation_id, platform, user_id,
        kind, note, metadata, status, needs_attention, rule_id, date_key,
        image_ref, created_at, updated_at
 FROM cases";

fn map_row(row: &rusqlite::Row<'_>) -> Result<CaseRecord, rusqlite::Error> {
    let kind: String = row.get(6)?;
    let kind = CaseKind::from_str(&kind)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;
    let status: String = row.get(9)?;
    let status = CaseStatus::from_str(&status)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;
    let metadata: Option<String> = row.get(8)?;
    let metadata = metadata.as_deref().and_then(|s| serde_json::from_str(s).ok());
    Ok(CaseRecord {
        id: row.get(0)?,
        tenant: row.get(1)?,
        bot_id: row.get(2)?,
        conversation_id: row.get(3)?,
        platform: row.get(4)?,
        user_id: row.get(5)?,
        kind,
        note: row.get(7)?,
        metadata,
        status,
        needs_attention: row.get::<_, i64>(10)? != 0,
        rule_id: row.get(11)?,
        date_key: row.get(12)?,
        image_ref: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn serialize_metadata(
    metadata: &Option<serde_json::Value>,
) -> Result<Option<String>, VeriflowError> {
    Ok(metadata.as_ref().map(|v| v.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_case(id: &str) -> CaseRecord {
        CaseRecord {
            id: id.to_string(),
            tenant: "t1".into(),
            bot_id: "b1".into(),
            conversation_id: "c1".into(),
            platform: "line".into(),
            user_id: "u1".into(),
            kind: CaseKind::Activity,
            note: Some("activity evidence".into()),
            metadata: Some(serde_json::json!({
                "label": "REVIEW",
                "confidence": 0.6,
                "passed": false,
            })),
            status: CaseStatus::Open,
            needs_attention: false,
            rule_id: None,
            date_key: Some("2026-01-01".into()),
            image_ref: Some("img://1".into()),
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[tokio::test]
    async fn create_and_get_roundtrips() {
        let (db, _dir) = setup_db().await;
        create(&db, &make_case("case-1")).await.unwrap();

        let loaded = get(&db, "case-1").await.unwrap().unwrap();
        assert_eq!(loaded.kind, CaseKind::Activity);
        assert_eq!(loaded.status, CaseStatus::Open);
        assert!(!loaded.needs_attention);
        assert_eq!(loaded.metadata.unwrap()["label"], "REVIEW");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_open_filters_and_orders() {
        let (db, _dir) = setup_db().await;
        let mut first = make_case("case-1");
        first.created_at = "2026-01-01T00:00:01.000Z".into();
        let mut second = make_case("case-2");
        second.created_at = "2026-01-01T00:00:02.000Z".into();
        create(&db, &second).await.unwrap();
        create(&db, &first).await.unwrap();

        record_decision(&db, "case-2", CaseStatus::Rejected, serde_json::json!({}))
            .await
            .unwrap();

        let open = list_open(&db, "t1", "b1").await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, "case-1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn record_decision_merges_metadata() {
        let (db, _dir) = setup_db().await;
        create(&db, &make_case("case-1")).await.unwrap();

        record_decision(
            &db,
            "case-1",
            CaseStatus::Approved,
            serde_json::json!({ "outcome": "pass", "code": "ABC123" }),
        )
        .await
        .unwrap();

        let loaded = get(&db, "case-1").await.unwrap().unwrap();
        assert_eq!(loaded.status, CaseStatus::Approved);
        let metadata = loaded.metadata.unwrap();
        // Original keys survive the merge.
        assert_eq!(metadata["label"], "REVIEW");
        assert_eq!(metadata["code"], "ABC123");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn flag_attention_sets_flag() {
        let (db, _dir) = setup_db().await;
        create(&db, &make_case("case-1")).await.unwrap();
        flag_attention(&db, "case-1").await.unwrap();
        assert!(get(&db, "case-1").await.unwrap().unwrap().needs_attention);
        db.close().await.unwrap();
    }
}
