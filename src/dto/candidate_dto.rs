use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::candidate::{Candidate, NewCandidate};
use crate::pipeline::{stage_order, CandidateStatus, StatusFilter};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCandidatePayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email, length(max = 100))]
    pub email: String,
    #[validate(length(max = 50))]
    pub whatsapp: Option<String>,
    #[validate(length(max = 150))]
    pub location: Option<String>,
    #[validate(length(max = 100))]
    pub highest_degree: Option<String>,
    #[validate(length(max = 100))]
    pub expected_salary: Option<String>,
    #[validate(range(min = 0, message = "Experience cannot be negative"))]
    pub experience_month: Option<i32>,
    pub profile_data: Option<JsonValue>,
}

impl From<CreateCandidatePayload> for NewCandidate {
    fn from(payload: CreateCandidatePayload) -> Self {
        NewCandidate {
            name: payload.name.trim().to_string(),
            email: payload.email.trim().to_lowercase(),
            whatsapp: payload.whatsapp,
            location: payload.location,
            highest_degree: payload.highest_degree,
            expected_salary: payload.expected_salary,
            experience_month: payload.experience_month,
            profile_data: payload.profile_data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSort {
    #[default]
    Newest,
    Progress,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateListQuery {
    #[serde(default)]
    pub filter_by: StatusFilter,
    #[serde(default)]
    pub sort: CandidateSort,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateResponse {
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
    pub stage_order: i32,
    pub is_senior: bool,
    pub survey: Option<JsonValue>,
    pub coding_test: Option<JsonValue>,
    pub interview: Option<JsonValue>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Candidate> for CandidateResponse {
    fn from(c: Candidate) -> Self {
        Self {
            stage_order: stage_order(c.processed_status),
            id: c.id,
            name: c.name,
            email: c.email,
            whatsapp: c.whatsapp,
            location: c.location,
            highest_degree: c.highest_degree,
            expected_salary: c.expected_salary,
            experience_month: c.experience_month,
            profile_data: c.profile_data,
            processed_status: c.processed_status,
            is_senior: c.is_senior,
            survey: c.survey,
            coding_test: c.coding_test,
            interview: c.interview,
            applied_at: c.applied_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateListResponse {
    pub items: Vec<CandidateResponse>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    pub index: usize,
    pub email: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ImportReport {
    pub created: Vec<Uuid>,
    pub failed: Vec<ImportFailure>,
}
