use std::cmp::Ordering;

use super::status::CandidateStatus;

/// Order value for statuses that are not part of the enumeration.
pub const UNMAPPED_ORDER: i32 = 0;

/// Sort key for progress bars and tables. `Rejected` sorts below every
/// forward stage.
pub const fn stage_order(status: CandidateStatus) -> i32 {
    match status {
        CandidateStatus::Applied => 1,
        CandidateStatus::ResumeScraped => 2,
        CandidateStatus::Screened => 3,
        CandidateStatus::Survey => 4,
        CandidateStatus::CodingTest => 5,
        CandidateStatus::InterviewTeamLead => 6,
        CandidateStatus::InterviewGeneralManager => 7,
        CandidateStatus::Offer => 8,
        CandidateStatus::Hired => 9,
        CandidateStatus::Rejected => -1,
    }
}

/// Order for unvalidated status text; unknown values map to [`UNMAPPED_ORDER`].
pub fn stage_order_of(raw: &str) -> i32 {
    raw.parse::<CandidateStatus>()
        .map(stage_order)
        .unwrap_or(UNMAPPED_ORDER)
}

/// Comparator used by list views to order candidates by pipeline progress.
pub fn compare_by_progress(a: CandidateStatus, b: CandidateStatus) -> Ordering {
    stage_order(a).cmp(&stage_order(b))
}

/// Anything carrying a pipeline stage, e.g. a stage history row.
pub trait Staged {
    fn stage(&self) -> CandidateStatus;

    fn stage_order(&self) -> i32 {
        stage_order(self.stage())
    }
}

impl Staged for CandidateStatus {
    fn stage(&self) -> CandidateStatus {
        *self
    }
}

/// Stable ascending sort by stage order; equal orders keep input order.
pub fn reorder_stages<T: Staged>(stages: &mut [T]) {
    stages.sort_by_key(|stage| stage.stage_order());
}

/// Stage of the last record after [`reorder_stages`], or `Applied` when the
/// history is empty.
pub fn latest_stage<T: Staged>(ordered: &[T]) -> CandidateStatus {
    ordered
        .last()
        .map(Staged::stage)
        .unwrap_or(CandidateStatus::Applied)
}
