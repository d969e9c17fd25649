use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::Result;
use crate::models::candidate::{Candidate, CandidateStage, NewCandidate};
use crate::models::notification::{StageChangedEvent, STAGE_CHANGED_EVENT};
use crate::pipeline::{is_senior, CandidateStatus, EmailTemplate};
use crate::services::candidate_store::{CandidateStore, TransitionOutcome, TransitionRequest};

const CANDIDATE_COLUMNS: &str = r#"
    id, name, email, whatsapp, location, highest_degree, expected_salary, experience_month,
    profile_data, processed_status, is_senior, survey, coding_test, interview, applied_at, updated_at
"#;

const STAGE_COLUMNS: &str = r#"
    id, candidate_id, stage_key, entered_at, exited_at, duration_seconds, hr_private_notes,
    send_email_on_reject, email_sent_at, created_by
"#;

/// Postgres-backed candidate store.
#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
    notification_url: Option<String>,
}

impl CandidateService {
    pub fn new(pool: PgPool, notification_url: Option<String>) -> Self {
        Self {
            pool,
            notification_url,
        }
    }

    async fn enqueue_stage_changes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        moved: &[(Uuid, String, String, CandidateStatus)],
        request: &TransitionRequest,
    ) -> Result<()> {
        let Some(target_url) = self.notification_url.as_deref() else {
            return Ok(());
        };

        let changed_at = Utc::now();
        for (id, name, email, from) in moved {
            let event = StageChangedEvent {
                candidate_id: *id,
                candidate_name: name.clone(),
                candidate_email: email.clone(),
                from: *from,
                to: request.target,
                email_template: EmailTemplate::for_stage(
                    request.target,
                    request.send_email_on_reject,
                ),
                changed_by: request.actor,
                changed_at,
            };
            sqlx::query(
                r#"
                INSERT INTO webhook_logs (event_type, payload, target_url, status)
                VALUES ($1, $2, $3, 'pending')
                "#,
            )
            .bind(STAGE_CHANGED_EVENT)
            .bind(serde_json::to_value(&event)?)
            .bind(target_url)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CandidateStore for CandidateService {
    async fn create_candidate(&self, candidate: NewCandidate) -> Result<Candidate> {
        let senior = is_senior(candidate.experience_month);
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Candidate>(&format!(
            r#"
            INSERT INTO candidates
                (name, email, whatsapp, location, highest_degree, expected_salary,
                 experience_month, profile_data, processed_status, is_senior)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CANDIDATE_COLUMNS}
            "#
        ))
        .bind(&candidate.name)
        .bind(&candidate.email)
        .bind(&candidate.whatsapp)
        .bind(&candidate.location)
        .bind(&candidate.highest_degree)
        .bind(&candidate.expected_salary)
        .bind(candidate.experience_month)
        .bind(&candidate.profile_data)
        .bind(CandidateStatus::Applied)
        .bind(senior)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO candidate_stages (candidate_id, stage_key, entered_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(created.id)
        .bind(CandidateStatus::Applied)
        .bind(created.applied_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        let candidate = sqlx::query_as::<_, Candidate>(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(candidate)
    }

    async fn get_candidates(&self, ids: Vec<Uuid>) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE id = ANY($1) ORDER BY applied_at DESC"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }

    async fn list_candidates(&self, status: Option<CandidateStatus>) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>(&format!(
            r#"
            SELECT {CANDIDATE_COLUMNS}
            FROM candidates
            WHERE ($1::candidate_status IS NULL OR processed_status = $1)
            ORDER BY applied_at DESC
            "#
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }

    async fn list_stages(&self, candidate_id: Uuid) -> Result<Vec<CandidateStage>> {
        let stages = sqlx::query_as::<_, CandidateStage>(&format!(
            "SELECT {STAGE_COLUMNS} FROM candidate_stages WHERE candidate_id = $1 ORDER BY entered_at ASC"
        ))
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(stages)
    }

    async fn apply_transition(&self, request: TransitionRequest) -> Result<TransitionOutcome> {
        let mut tx = self.pool.begin().await?;

        let moved = sqlx::query_as::<_, (Uuid, String, String, CandidateStatus)>(
            r#"
            SELECT id, name, email, processed_status
            FROM candidates
            WHERE id = ANY($1)
            FOR UPDATE
            "#,
        )
        .bind(&request.ids)
        .fetch_all(&mut *tx)
        .await?;

        let found: HashSet<Uuid> = moved.iter().map(|row| row.0).collect();
        let (updated, skipped): (Vec<Uuid>, Vec<Uuid>) =
            request.ids.iter().copied().partition(|id| found.contains(id));
        let stale: Vec<Uuid> = moved
            .iter()
            .filter(|(id, _, _, current)| !request.from.allows(*id, *current))
            .map(|row| row.0)
            .collect();

        if updated.is_empty() || !stale.is_empty() {
            tx.rollback().await?;
            if !stale.is_empty() {
                tracing::warn!(stale = ?stale, target_status = %request.target, "Stage changed before transition");
            }
            return Ok(TransitionOutcome {
                target_status: request.target,
                updated: Vec::new(),
                skipped,
                stale,
            });
        }

        sqlx::query(
            r#"
            UPDATE candidate_stages s
            SET exited_at = NOW(),
                duration_seconds = EXTRACT(EPOCH FROM NOW() - latest.max_entered_at)::bigint,
                hr_private_notes = $2
            FROM (
                SELECT candidate_id, MAX(entered_at) AS max_entered_at
                FROM candidate_stages
                WHERE candidate_id = ANY($1)
                GROUP BY candidate_id
            ) latest
            WHERE s.candidate_id = latest.candidate_id
              AND s.entered_at = latest.max_entered_at
              AND s.exited_at IS NULL
            "#,
        )
        .bind(&updated)
        .bind(&request.note)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE candidates
            SET processed_status = $1, updated_at = NOW()
            WHERE id = ANY($2)
            "#,
        )
        .bind(request.target)
        .bind(&updated)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO candidate_stages (candidate_id, stage_key, send_email_on_reject, created_by)
            SELECT candidate_id, $2, $3, $4
            FROM UNNEST($1::uuid[]) AS candidate_id
            "#,
        )
        .bind(&updated)
        .bind(request.target)
        .bind(request.send_email_on_reject && request.target == CandidateStatus::Rejected)
        .bind(request.actor)
        .execute(&mut *tx)
        .await?;

        self.enqueue_stage_changes(&mut tx, &moved, &request).await?;

        tx.commit().await?;

        tracing::info!(
            target_status = %request.target,
            updated = updated.len(),
            skipped = skipped.len(),
            "Applied stage transition"
        );

        Ok(TransitionOutcome {
            target_status: request.target,
            updated,
            skipped,
            stale,
        })
    }

    async fn status_counts(&self) -> Result<HashMap<CandidateStatus, i64>> {
        let rows = sqlx::query_as::<_, (CandidateStatus, i64)>(
            r#"
            SELECT processed_status, COUNT(*)
            FROM candidates
            GROUP BY processed_status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
