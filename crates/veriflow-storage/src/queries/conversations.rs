// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state operations: pending intent and last-image stitching.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use veriflow_core::types::{ConversationKey, PendingIntent};
use veriflow_core::VeriflowError;

use crate::database::Database;
use crate::models::Conversation;

const PENDING_ACTIVITY: &str = "activity";
const PENDING_IMAGE_QUESTION: &str = "image_question";

/// Fetch the conversation for `key`, creating an empty one if absent.
pub async fn get_or_create(
    db: &Database,
    key: &ConversationKey,
    now: DateTime<Utc>,
) -> Result<Conversation, VeriflowError> {
    let key = key.clone();
    let now = now.to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, tenant, bot_id, platform, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 ON CONFLICT (tenant, bot_id, platform, user_id) DO NOTHING",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    key.tenant,
                    key.bot_id,
                    key.platform,
                    key.user_id,
                    now,
                ],
            )?;
            let conversation = select_by_key(conn, &key)?
                .ok_or_else(|| Box::<dyn std::error::Error + Send + Sync>::from(
                    "conversation upsert vanished",
                ))?;
            Ok(conversation)
        })
        .await
        .map_err(crate::database::map_tr_boxed_err)
}

/// Fetch the conversation for `key`, if it exists.
pub async fn get(
    db: &Database,
    key: &ConversationKey,
) -> Result<Option<Conversation>, VeriflowError> {
    let key = key.clone();
    db.connection()
        .call(move |conn| Ok(select_by_key(conn, &key)?))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist the conversation's pending-intent state. `PendingIntent::None`
/// clears all three columns.
pub async fn write_pending(
    db: &Database,
    key: &ConversationKey,
    pending: &PendingIntent,
) -> Result<(), VeriflowError> {
    let key = key.clone();
    let (kind, since, note) = pending_to_columns(pending);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations
                 SET pending_kind = ?1, pending_at = ?2, pending_note = ?3,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE tenant = ?4 AND bot_id = ?5 AND platform = ?6 AND user_id = ?7",
                params![
                    kind, since, note, key.tenant, key.bot_id, key.platform, key.user_id
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record the most recently received image for the conversation.
pub async fn record_last_image(
    db: &Database,
    key: &ConversationKey,
    image_ref: &str,
    now: DateTime<Utc>,
) -> Result<(), VeriflowError> {
    let key = key.clone();
    let image_ref = image_ref.to_string();
    let now = now.to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations
                 SET last_image_ref = ?1, last_image_at = ?2,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE tenant = ?3 AND bot_id = ?4 AND platform = ?5 AND user_id = ?6",
                params![image_ref, now, key.tenant, key.bot_id, key.platform, key.user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn select_by_key(
    conn: &rusqlite::Connection,
    key: &ConversationKey,
) -> Result<Option<Conversation>, rusqlite::Error> {
    conn.query_row(
        "SELECT id, tenant, bot_id, platform, user_id,
                pending_kind, pending_at, pending_note,
                last_image_ref, last_image_at, created_at, updated_at
         FROM conversations
         WHERE tenant = ?1 AND bot_id = ?2 AND platform = ?3 AND user_id = ?4",
        params![key.tenant, key.bot_id, key.platform, key.user_id],
        |row| {
            let pending = columns_to_pending(row.get(5)?, row.get(6)?, row.get(7)?);
            Ok(Conversation {
                id: row.get(0)?,
                tenant: row.get(1)?,
                bot_id: row.get(2)?,
                platform: row.get(3)?,
                user_id: row.get(4)?,
                pending,
                last_image_ref: row.get(8)?,
                last_image_at: row.get(9)?,
                created_at: row.get(10)?,
                updated_at: row.get(11)?,
            })
        },
    )
    .optional()
}

fn pending_to_columns(
    pending: &PendingIntent,
) -> (Option<&'static str>, Option<String>, Option<String>) {
    match pending {
        PendingIntent::None => (None, None, None),
        PendingIntent::PendingActivity { since, note } => {
            (Some(PENDING_ACTIVITY), Some(since.to_rfc3339()), note.clone())
        }
        PendingIntent::PendingImageQuestion { since, note } => (
            Some(PENDING_IMAGE_QUESTION),
            Some(since.to_rfc3339()),
            note.clone(),
        ),
    }
}

fn columns_to_pending(
    kind: Option<String>,
    at: Option<String>,
    note: Option<String>,
) -> PendingIntent {
    // A kind without a parseable timestamp is treated as no pending state;
    // the columns are disposable short-lived state, not a ledger.
    let since = at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    match (kind.as_deref(), since) {
        (Some(PENDING_ACTIVITY), Some(since)) => PendingIntent::PendingActivity { since, note },
        (Some(PENDING_IMAGE_QUESTION), Some(since)) => {
            PendingIntent::PendingImageQuestion { since, note }
        }
        _ => PendingIntent::None,
    }
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

    fn make_key() -> ConversationKey {
        ConversationKey {
            tenant: "t1".into(),
            bot_id: "b1".into(),
            platform: "line".into(),
            user_id: "u1".into(),
        }
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let (db, _dir) = setup_db().await;
        let key = make_key();

        let c1 = get_or_create(&db, &key, Utc::now()).await.unwrap();
        let c2 = get_or_create(&db, &key, Utc::now()).await.unwrap();
        assert_eq!(c1.id, c2.id);
        assert!(c1.pending.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn pending_state_roundtrips() {
        let (db, _dir) = setup_db().await;
        let key = make_key();
        get_or_create(&db, &key, Utc::now()).await.unwrap();

        let since = Utc::now();
        let pending = PendingIntent::PendingActivity {
            since,
            note: Some("I want to submit my activity".into()),
        };
        write_pending(&db, &key, &pending).await.unwrap();

        let loaded = get(&db, &key).await.unwrap().unwrap();
        assert!(loaded.pending.is_activity());
        // RFC 3339 roundtrip keeps sub-second precision.
        assert_eq!(loaded.pending.since().unwrap(), since);

        write_pending(&db, &key, &PendingIntent::None).await.unwrap();
        let cleared = get(&db, &key).await.unwrap().unwrap();
        assert!(cleared.pending.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn last_image_is_recorded() {
        let (db, _dir) = setup_db().await;
        let key = make_key();
        get_or_create(&db, &key, Utc::now()).await.unwrap();

        record_last_image(&db, &key, "img://abc", Utc::now())
            .await
            .unwrap();
        let loaded = get(&db, &key).await.unwrap().unwrap();
        assert_eq!(loaded.last_image_ref.as_deref(), Some("img://abc"));
        assert!(loaded.last_image_at.is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_conversation_is_none() {
        let (db, _dir) = setup_db().await;
        assert!(get(&db, &make_key()).await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
