// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes: the
//! allocator's transaction relies on this single-writer model.

use std::path::Path;

use tokio_rusqlite::Connection;
use tracing::debug;

use veriflow_core::VeriflowError;

use crate::migrations;

/// Handle to the single-writer SQLite database.
///
/// Cloning is cheap; all clones share the same background connection.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path`, apply PRAGMAs, and
    /// run all pending migrations.
    pub async fn open(path: &str) -> Result<Self, VeriflowError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| VeriflowError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            migrations::run_migrations(conn)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
            Ok(())
        })
        .await
        .map_err(map_tr_boxed_err)?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// Returns the shared tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), VeriflowError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the storage error variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> VeriflowError {
    VeriflowError::Storage {
        source: Box::new(e),
    }
}

/// Map a tokio-rusqlite error whose application error is already boxed.
pub(crate) fn map_tr_boxed_err(
    e: tokio_rusqlite::Error<Box<dyn std::error::Error + Send + Sync>>,
) -> VeriflowError {
    match e {
        tokio_rusqlite::Error::Error(source) => VeriflowError::Storage { source },
        tokio_rusqlite::Error::ConnectionClosed => {
            map_tr_err(tokio_rusqlite::Error::ConnectionClosed)
        }
        tokio_rusqlite::Error::Close(pair) => map_tr_err(tokio_rusqlite::Error::Close(pair)),
        other => VeriflowError::Storage {
            source: other.to_string().into(),
        },
    }
}
