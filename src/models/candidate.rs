use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use crate::pipeline::{CandidateStatus, Staged};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub location: Option<String>,
    pub highest_degree: Option<String>,
    pub expected_salary: Option<String>,
    pub experience_month: Option<i32>,
    pub profile_data: Option<JsonValue>,
    pub processed_status: CandidateStatus,
    pub is_senior: bool,
    pub survey: Option<JsonValue>,
    pub coding_test: Option<JsonValue>,
    pub interview: Option<JsonValue>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Staged for Candidate {
    fn stage(&self) -> CandidateStatus {
        self.processed_status
    }
}

/// Append-only stage history row. The open stage has no `exited_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateStage {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub stage_key: CandidateStatus,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub hr_private_notes: Option<String>,
    pub send_email_on_reject: bool,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
}

impl Staged for CandidateStage {
    fn stage(&self) -> CandidateStatus {
        self.stage_key
    }
}

/// Fields captured at intake. Seniority is derived from `experience_month`.
#[derive(Debug, Clone, Default)]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub location: Option<String>,
    pub highest_degree: Option<String>,
    pub expected_salary: Option<String>,
    pub experience_month: Option<i32>,
    pub profile_data: Option<JsonValue>,
}
