use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::candidate::CandidateStage;
use crate::pipeline::{stage_order, CandidateStatus, StatusFilter};

/// Note attached to a single-candidate decision.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DecisionPayload {
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub note: String,
    #[serde(default)]
    pub send_email_on_reject: bool,
}

/// Batch decision over the candidates currently shown under `filter_by`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BatchDecisionPayload {
    pub ids: Vec<Uuid>,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub note: String,
    #[serde(default)]
    pub filter_by: StatusFilter,
    /// Branch taken when the filter is `coding_test`; defaults to the
    /// standard path.
    #[serde(default)]
    pub is_senior: bool,
    #[serde(default)]
    pub send_email_on_reject: bool,
}

/// Explicit-target stage update, the shape the admin frontend posts.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CandidateStageUpdate {
    #[validate(length(min = 1, message = "At least one candidate id is required"))]
    pub id: Vec<Uuid>,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub note: String,
    pub candidate_status: CandidateStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageView {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub stage_key: CandidateStatus,
    pub stage_order: i32,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub hr_private_notes: Option<String>,
    pub send_email_on_reject: bool,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
}

impl From<CandidateStage> for StageView {
    fn from(s: CandidateStage) -> Self {
        Self {
            stage_order: stage_order(s.stage_key),
            id: s.id,
            candidate_id: s.candidate_id,
            stage_key: s.stage_key,
            entered_at: s.entered_at,
            exited_at: s.exited_at,
            duration_seconds: s.duration_seconds,
            hr_private_notes: s.hr_private_notes,
            send_email_on_reject: s.send_email_on_reject,
            email_sent_at: s.email_sent_at,
            created_by: s.created_by,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageHistoryResponse {
    pub candidate_id: Uuid,
    pub is_senior: bool,
    pub latest_stage: CandidateStatus,
    pub latest_stage_order: i32,
    pub next_stage: Option<CandidateStatus>,
    pub is_hired: bool,
    pub is_rejected: bool,
    pub stages: Vec<StageView>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NextStatusQuery {
    pub status: String,
    #[serde(default)]
    pub is_senior: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NextStatusResponse {
    pub status: String,
    pub stage_order: i32,
    pub next_status: Option<CandidateStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlowQuery {
    pub is_senior: Option<bool>,
}
