//! SQLite-Implementierung des NotificationRepository

use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::error::{sqlx_abbilden, DbError};
use crate::models::BenachrichtigungRecord;
use crate::repository::{DbResult, NotificationRepository};
use crate::sqlite::pool::SqliteDb;

impl NotificationRepository for SqliteDb {
    async fn append(
        &self,
        message: &str,
        zeitpunkt: DateTime<Utc>,
    ) -> DbResult<BenachrichtigungRecord> {
        let ergebnis = sqlx::query("INSERT INTO notifications (message, created_at) VALUES (?, ?)")
            .bind(message)
            .bind(zeitpunkt.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(sqlx_abbilden)?;

        Ok(BenachrichtigungRecord {
            id: ergebnis.last_insert_rowid(),
            message: message.to_string(),
            created_at: zeitpunkt,
        })
    }

    async fn list_recent(&self, limit: i64) -> DbResult<Vec<BenachrichtigungRecord>> {
        let rows = sqlx::query(
            "SELECT id, message, created_at FROM notifications
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(sqlx_abbilden)?;

        rows.iter()
            .map(|row| -> DbResult<BenachrichtigungRecord> {
                let created_at: String = row.try_get("created_at")?;
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .map_err(|e| DbError::intern(format!("Ungueltige created_at: {e}")))?
                    .with_timezone(&Utc);
                Ok(BenachrichtigungRecord {
                    id: row.try_get("id")?,
                    message: row.try_get("message")?,
                    created_at,
                })
            })
            .collect()
    }
}
