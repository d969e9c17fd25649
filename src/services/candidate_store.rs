use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::models::candidate::{Candidate, CandidateStage, NewCandidate};
use crate::pipeline::CandidateStatus;

/// Stage a candidate must still be in when its row is locked. The target
/// was resolved from that stage, so any other stage makes it stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedStage {
    /// Every id shares one stage (single decision, batch by filter).
    All(CandidateStatus),
    /// Stage observed per candidate before the decision.
    Each(HashMap<Uuid, CandidateStatus>),
}

impl ExpectedStage {
    pub fn allows(&self, id: Uuid, current: CandidateStatus) -> bool {
        match self {
            ExpectedStage::All(expected) => *expected == current,
            ExpectedStage::Each(expected) => expected.get(&id) == Some(&current),
        }
    }
}

/// A resolved transition ready to persist: every id moves to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    pub ids: Vec<Uuid>,
    pub from: ExpectedStage,
    pub note: String,
    pub target: CandidateStatus,
    pub send_email_on_reject: bool,
    pub actor: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    pub target_status: CandidateStatus,
    pub updated: Vec<Uuid>,
    pub skipped: Vec<Uuid>,
    /// Existing candidates no longer in the expected stage. When non-empty
    /// nothing was written.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stale: Vec<Uuid>,
}

/// Persistence for candidates and their stage history.
///
/// `apply_transition` must be all-or-nothing for the ids that exist: close
/// each open stage (exit time, duration, note), set `processed_status`, and
/// append the new stage row. Unknown ids are returned in `skipped`. The
/// stage check against `from` happens on the locked rows; if any row fails
/// it, nothing is written and those ids come back in `stale`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn create_candidate(&self, candidate: NewCandidate) -> Result<Candidate>;

    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>>;

    async fn get_candidates(&self, ids: Vec<Uuid>) -> Result<Vec<Candidate>>;

    /// Newest applications first.
    async fn list_candidates(&self, status: Option<CandidateStatus>) -> Result<Vec<Candidate>>;

    async fn list_stages(&self, candidate_id: Uuid) -> Result<Vec<CandidateStage>>;

    async fn apply_transition(&self, request: TransitionRequest) -> Result<TransitionOutcome>;

    async fn status_counts(&self) -> Result<HashMap<CandidateStatus, i64>>;
}
