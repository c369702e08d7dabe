//! Data Access Layer
//!
//! Completed interviews are archived to PostgreSQL: one row per session plus
//! its turn log and transcript, written in a single transaction. Queries are
//! built at runtime so the crate builds without a live database.

use anyhow::{Context, Result};
use async_trait::async_trait;
use conductor_core::{SessionArchive, SessionRecord};
use sqlx::PgPool;
use tracing::info;

/// A wrapper around the `PgPool` to provide a clear data access interface.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Creates a new `Db` instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs all pending `sqlx` migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Stores a completed session with its turns and transcript.
    ///
    /// Archiving the same session twice keeps the first copy.
    pub async fn archive_session(&self, record: &SessionRecord) -> Result<()> {
        let session = &record.session;
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO interview_sessions
                (id, phase, context, catalog, visited_topic_ids, turn_count,
                 closing_exchanges, created_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(session.id)
        .bind(session.phase.as_str())
        .bind(serde_json::to_value(&session.context)?)
        .bind(serde_json::to_value(&*session.catalog)?)
        .bind(&session.visited_topic_ids)
        .bind(session.turn_count as i32)
        .bind(session.closing_exchanges as i32)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&mut *tx)
        .await
        .context("Failed to insert archived session")?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(());
        }

        for turn in &record.turns {
            sqlx::query(
                r#"
                INSERT INTO interview_turns
                    (session_id, sequence, action, reason, topic_before, topic_after,
                     utterance, hint_topic_id, recorded_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(session.id)
            .bind(turn.sequence as i32)
            .bind(turn.action.as_str())
            .bind(turn.reason.as_str())
            .bind(turn.topic_before.as_deref())
            .bind(turn.topic_after.as_deref())
            .bind(&turn.utterance)
            .bind(turn.hint_topic_id.as_deref())
            .bind(turn.recorded_at)
            .execute(&mut *tx)
            .await
            .context("Failed to insert archived turn")?;
        }

        for (position, entry) in record.transcript.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO transcript_entries (session_id, position, speaker, text, spoken_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(session.id)
            .bind(position as i32)
            .bind(entry.speaker.as_str())
            .bind(&entry.text)
            .bind(entry.at)
            .execute(&mut *tx)
            .await
            .context("Failed to insert transcript entry")?;
        }

        tx.commit().await?;
        info!(
            session_id = %session.id,
            turns = record.turns.len(),
            transcript_entries = record.transcript.len(),
            "Session archived"
        );
        Ok(())
    }
}

#[async_trait]
impl SessionArchive for Db {
    async fn archive(&self, record: &SessionRecord) -> Result<()> {
        self.archive_session(record).await
    }
}
