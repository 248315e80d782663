// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Evidence image rows: one per received image, insert-only.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension};

use veriflow_core::types::EvidenceLabel;
use veriflow_core::VeriflowError;

use crate::database::Database;
use crate::models::EvidenceImage;

/// Insert one evidence row. Rows are never mutated afterwards.
pub async fn insert(db: &Database, image: &EvidenceImage) -> Result<(), VeriflowError> {
    let image = image.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO evidence_images
                 (id, tenant, bot_id, conversation_id, image_ref, label, confidence,
                  reason, case_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    image.id,
                    image.tenant,
                    image.bot_id,
                    image.conversation_id,
                    image.image_ref,
                    image.label.to_string(),
                    image.confidence as f64,
                    image.reason,
                    image.case_id,
                    image.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one evidence row by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<EvidenceImage>, VeriflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, tenant, bot_id, conversation_id, image_ref, label,
                            confidence, reason, case_id, created_at
                     FROM evidence_images WHERE id = ?1",
                    params![id],
                    map_row,
                )
                .optional()?;
            Ok(row)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all evidence received in a conversation, oldest first.
pub async fn list_for_conversation(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<EvidenceImage>, VeriflowError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, tenant, bot_id, conversation_id, image_ref, label,
                        confidence, reason, case_id, created_at
                 FROM evidence_images WHERE conversation_id = ?1
                 ORDER BY created_at ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id], map_row)?;
            let mut images = Vec::new();
            for row in rows {
                images.push(row?);
            }
            Ok(images)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn map_row(row: &rusqlite::Row<'_>) -> Result<EvidenceImage, rusqlite::Error> {
    let label: String = row.get(5)?;
    let label = EvidenceLabel::from_str(&label)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    Ok(EvidenceImage {
        id: row.get(0)?,
        tenant: row.get(1)?,
        bot_id: row.get(2)?,
        conversation_id: row.get(3)?,
        image_ref: row.get(4)?,
        label,
        confidence: row.get::<_, f64>(6)? as f32,
        reason: row.get(7)?,
        case_id: row.get(8)?,
        created_at: row.get(9)?,
    })
}
