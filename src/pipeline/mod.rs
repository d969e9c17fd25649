//! Recruitment pipeline rules: stage ordering, forward transitions with the
//! seniority branch, rejection and batch planning.
//!
//! Everything here is pure and synchronous. Persistence and HTTP live in
//! `services` and `routes` and call into this module for every decision.

pub mod order;
pub mod seniority;
pub mod status;
pub mod templates;
pub mod transition;

use serde::Serialize;

pub use order::{
    compare_by_progress, latest_stage, reorder_stages, stage_order, stage_order_of, Staged,
    UNMAPPED_ORDER,
};
pub use seniority::{is_senior, Seniority, SENIOR_YEAR_EXPERIENCE};
pub use status::{CandidateStatus, StatusFilter, UnknownStatus};
pub use templates::EmailTemplate;
pub use transition::{
    next_status, next_status_for_filter, next_status_of, reject_target, BatchPlanError,
    BatchTransition, Decision,
};

/// One node of the recruitment flow as shown to HR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowStage {
    pub title: String,
    pub order: i32,
    pub value: CandidateStatus,
}

/// The flow dictionary in declaration order. The team-lead interview is
/// only part of the flow for senior candidates.
pub fn recruitment_flow(include_team_lead: bool) -> Vec<FlowStage> {
    CandidateStatus::ALL
        .into_iter()
        .filter(|status| include_team_lead || *status != CandidateStatus::InterviewTeamLead)
        .map(|status| FlowStage {
            title: status.title(),
            order: stage_order(status),
            value: status,
        })
        .collect()
}
