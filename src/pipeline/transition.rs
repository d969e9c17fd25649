use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::seniority::Seniority;
use super::status::{CandidateStatus, StatusFilter};

/// Forward edge of the pipeline. Never yields `Rejected`; `None` means the
/// candidate has nowhere further to go.
pub fn next_status(current: CandidateStatus, is_senior: bool) -> Option<CandidateStatus> {
    use CandidateStatus::*;

    match (current, Seniority::from(is_senior)) {
        (Applied, _) => Some(ResumeScraped),
        (ResumeScraped, _) => Some(Screened),
        (Screened, _) => Some(Survey),
        (Survey, _) => Some(CodingTest),
        (CodingTest, Seniority::Senior) => Some(InterviewTeamLead),
        (CodingTest, Seniority::Standard) => Some(InterviewGeneralManager),
        (InterviewTeamLead, _) => Some(InterviewGeneralManager),
        (InterviewGeneralManager, _) => Some(Offer),
        (Offer, _) => Some(Hired),
        (Hired | Rejected, _) => None,
    }
}

pub fn next_status_for_filter(filter: StatusFilter, is_senior: bool) -> Option<CandidateStatus> {
    filter
        .status()
        .and_then(|status| next_status(status, is_senior))
}

/// Forward edge for unvalidated status text. Unknown text has no edge.
pub fn next_status_of(raw: &str, is_senior: bool) -> Option<CandidateStatus> {
    raw.parse::<CandidateStatus>()
        .ok()
        .and_then(|status| next_status(status, is_senior))
}

/// Rejection is open to every non-terminal candidate.
pub fn reject_target(current: CandidateStatus) -> Option<CandidateStatus> {
    if current.is_terminal() {
        None
    } else {
        Some(CandidateStatus::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Target status for a candidate currently in `current`.
    pub fn resolve(self, current: CandidateStatus, is_senior: bool) -> Option<CandidateStatus> {
        match self {
            Decision::Approve => next_status(current, is_senior),
            Decision::Reject => reject_target(current),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchPlanError {
    #[error("Please specify the recruitment process")]
    UnspecifiedFilter,
    #[error("No candidates selected")]
    EmptySelection,
    #[error("Can't update recruitment process")]
    NoTransition,
}

/// One edge of the graph applied to many candidates at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchTransition {
    pub ids: Vec<Uuid>,
    pub note: String,
    pub from: CandidateStatus,
    pub target: CandidateStatus,
}

impl BatchTransition {
    /// Resolves the target once for the whole selection. Rejection is only
    /// offered where approval would be, so terminal filters fail both ways.
    pub fn plan(
        decision: Decision,
        filter: StatusFilter,
        is_senior: bool,
        ids: Vec<Uuid>,
        note: String,
    ) -> Result<Self, BatchPlanError> {
        let from = filter.status().ok_or(BatchPlanError::UnspecifiedFilter)?;
        let forward = next_status(from, is_senior).ok_or(BatchPlanError::NoTransition)?;
        let target = match decision {
            Decision::Approve => forward,
            Decision::Reject => reject_target(from).ok_or(BatchPlanError::NoTransition)?,
        };

        let mut ids = ids;
        let mut seen = std::collections::HashSet::new();
        ids.retain(|id| seen.insert(*id));
        if ids.is_empty() {
            return Err(BatchPlanError::EmptySelection);
        }

        Ok(Self {
            ids,
            note,
            from,
            target,
        })
    }
}
