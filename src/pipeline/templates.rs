use serde::{Deserialize, Serialize};

use super::status::CandidateStatus;

/// Candidate email sent when a stage is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    NextStep,
    SurveyInvitation,
    CodingTestInvitation,
    TeamLeadInterviewInvitation,
    GeneralManagerInterviewInvitation,
    Offering,
    Hired,
    Rejection,
}

impl EmailTemplate {
    /// Template for entering `status`. Rejection mails are opt-in per
    /// transition, and nothing is sent for the initial `applied` stage.
    pub fn for_stage(status: CandidateStatus, send_email_on_reject: bool) -> Option<Self> {
        match status {
            CandidateStatus::Applied => None,
            CandidateStatus::ResumeScraped | CandidateStatus::Screened => {
                Some(EmailTemplate::NextStep)
            }
            CandidateStatus::Survey => Some(EmailTemplate::SurveyInvitation),
            CandidateStatus::CodingTest => Some(EmailTemplate::CodingTestInvitation),
            CandidateStatus::InterviewTeamLead => Some(EmailTemplate::TeamLeadInterviewInvitation),
            CandidateStatus::InterviewGeneralManager => {
                Some(EmailTemplate::GeneralManagerInterviewInvitation)
            }
            CandidateStatus::Offer => Some(EmailTemplate::Offering),
            CandidateStatus::Hired => Some(EmailTemplate::Hired),
            CandidateStatus::Rejected => send_email_on_reject.then_some(EmailTemplate::Rejection),
        }
    }
}
