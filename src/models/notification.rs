use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use crate::pipeline::{CandidateStatus, EmailTemplate};

pub const STAGE_CHANGED_EVENT: &str = "candidate.stage_changed";

/// Outbox row for an outbound webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WebhookLog {
    pub id: Uuid,
    pub event_type: String,
    pub payload: JsonValue,
    pub target_url: String,
    pub http_status: Option<i32>,
    pub response_body: Option<String>,
    pub attempts: i32,
    pub max_attempts: i32,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageChangedEvent {
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub from: CandidateStatus,
    pub to: CandidateStatus,
    pub email_template: Option<EmailTemplate>,
    pub changed_by: Option<Uuid>,
    pub changed_at: DateTime<Utc>,
}
