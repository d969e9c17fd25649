use crate::error::Result;
use crate::models::notification::WebhookLog;
use reqwest::Client;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub const RETRY_BASE_SECS: i64 = 30;
pub const RETRY_CAP_SECS: i64 = 3600;

/// Delay before retry number `attempts + 1`: 30s doubling per failed
/// attempt, capped at one hour.
pub fn retry_delay_secs(attempts: i32) -> i64 {
    let exponent = (attempts - 1).clamp(0, 20) as u32;
    (RETRY_BASE_SECS * 2_i64.pow(exponent)).min(RETRY_CAP_SECS)
}

/// Delivers `candidate.stage_changed` outbox rows to the notification
/// webhook. Rows are written by the transition transaction.
#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
    client: Client,
    webhook_secret: String,
}

impl NotificationService {
    pub fn new(pool: PgPool, webhook_secret: String) -> Self {
        Self {
            pool,
            client: Client::new(),
            webhook_secret,
        }
    }

    pub async fn deliver_once(&self, log_id: Uuid) -> Result<()> {
        let log = sqlx::query_as::<_, WebhookLog>(
            r#"
            SELECT id, event_type, payload, target_url, http_status, response_body, attempts,
                   max_attempts, next_retry_at, status, created_at, updated_at
            FROM webhook_logs
            WHERE id = $1
            "#,
        )
        .bind(log_id)
        .fetch_one(&self.pool)
        .await?;

        let res = self
            .client
            .post(&log.target_url)
            .header("X-Webhook-Secret", &self.webhook_secret)
            .header("X-Event-Type", &log.event_type)
            .json(&log.payload)
            .send()
            .await;

        match res {
            Ok(resp) => {
                let status = resp.status().as_u16() as i32;
                let body = resp.text().await.unwrap_or_default();
                sqlx::query(
                    r#"
                    UPDATE webhook_logs
                    SET http_status = $1,
                        response_body = $2,
                        status = CASE WHEN $1 BETWEEN 200 AND 299 THEN 'success' ELSE 'failed' END,
                        attempts = attempts + 1,
                        updated_at = NOW()
                    WHERE id = $3
                    "#,
                )
                .bind(status)
                .bind(body)
                .bind(log.id)
                .execute(&self.pool)
                .await?;
            }
            Err(err) => {
                tracing::warn!(log_id = %log.id, error = %err, "Webhook delivery failed");
                sqlx::query(
                    r#"
                    UPDATE webhook_logs
                    SET response_body = $1, status = 'failed', attempts = attempts + 1, updated_at = NOW()
                    WHERE id = $2
                    "#,
                )
                .bind(err.to_string())
                .bind(log.id)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }

    /// Picks one due row and tries it. Returns `false` when nothing is due.
    pub async fn run_once(&self) -> Result<bool> {
        let row_opt = sqlx::query(
            r#"
            SELECT id FROM webhook_logs
            WHERE status = 'pending' AND (next_retry_at IS NULL OR next_retry_at <= NOW())
            ORDER BY created_at ASC
            FOR UPDATE SKIP LOCKED
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row_opt else { return Ok(false) };
        let id: Uuid = row.try_get("id")?;

        if let Err(e) = self.deliver_once(id).await {
            tracing::error!(log_id = %id, error = ?e, "Could not record webhook delivery");
        }

        let row = sqlx::query("SELECT attempts, max_attempts, status FROM webhook_logs WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        let attempts: i32 = row.try_get("attempts")?;
        let max_attempts: i32 = row.try_get("max_attempts")?;
        let status: String = row.try_get("status")?;

        if status == "failed" && attempts < max_attempts {
            sqlx::query(
                r#"
                UPDATE webhook_logs
                SET status = 'pending', next_retry_at = NOW() + make_interval(secs => $2)
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(retry_delay_secs(attempts) as f64)
            .execute(&self.pool)
            .await?;
        } else if status == "failed" {
            tracing::warn!(log_id = %id, attempts, "Webhook delivery gave up");
        }

        Ok(true)
    }
}
