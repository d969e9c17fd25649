use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A candidate's position in the recruitment pipeline.
///
/// The string forms are shared with the database enum `candidate_status`
/// and the JSON API, so renaming a variant is a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "candidate_status", rename_all = "snake_case")]
pub enum CandidateStatus {
    Applied,
    ResumeScraped,
    Screened,
    Survey,
    CodingTest,
    InterviewTeamLead,
    InterviewGeneralManager,
    Offer,
    Hired,
    Rejected,
}

impl CandidateStatus {
    /// Every status in pipeline order, with `Rejected` last.
    pub const ALL: [CandidateStatus; 10] = [
        CandidateStatus::Applied,
        CandidateStatus::ResumeScraped,
        CandidateStatus::Screened,
        CandidateStatus::Survey,
        CandidateStatus::CodingTest,
        CandidateStatus::InterviewTeamLead,
        CandidateStatus::InterviewGeneralManager,
        CandidateStatus::Offer,
        CandidateStatus::Hired,
        CandidateStatus::Rejected,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CandidateStatus::Applied => "applied",
            CandidateStatus::ResumeScraped => "resume_scraped",
            CandidateStatus::Screened => "screened",
            CandidateStatus::Survey => "survey",
            CandidateStatus::CodingTest => "coding_test",
            CandidateStatus::InterviewTeamLead => "interview_team_lead",
            CandidateStatus::InterviewGeneralManager => "interview_general_manager",
            CandidateStatus::Offer => "offer",
            CandidateStatus::Hired => "hired",
            CandidateStatus::Rejected => "rejected",
        }
    }

    /// Human readable label, e.g. "interview team lead".
    pub fn title(self) -> String {
        self.as_str().replace('_', " ")
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, CandidateStatus::Hired | CandidateStatus::Rejected)
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown candidate status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for CandidateStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CandidateStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// List filter used by the candidate views. `All` is a UI sentinel and is
/// never stored on a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Status(CandidateStatus),
}

impl StatusFilter {
    pub fn status(self) -> Option<CandidateStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Status(status) => Some(status),
        }
    }
}

impl From<CandidateStatus> for StatusFilter {
    fn from(status: CandidateStatus) -> Self {
        StatusFilter::Status(status)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Status(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Status)
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatusFilter> for String {
    fn from(filter: StatusFilter) -> Self {
        filter.to_string()
    }
}
