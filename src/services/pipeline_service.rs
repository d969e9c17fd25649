use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::dto::candidate_dto::{
    CandidateListResponse, CandidateResponse, CandidateSort, ImportFailure, ImportReport,
    Metadata,
};
use crate::dto::stage_dto::{StageHistoryResponse, StageView};
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, NewCandidate};
use crate::pipeline::{
    compare_by_progress, latest_stage, next_status, reject_target, reorder_stages, stage_order,
    BatchPlanError, BatchTransition, CandidateStatus, Decision, StatusFilter,
};
use crate::services::candidate_store::{
    CandidateStore, ExpectedStage, TransitionOutcome, TransitionRequest,
};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 200;

/// Applies the pipeline rules on top of a [`CandidateStore`]. Every
/// transition target is resolved here before anything is persisted.
#[derive(Clone)]
pub struct PipelineService {
    store: Arc<dyn CandidateStore>,
}

impl PipelineService {
    pub fn new(store: Arc<dyn CandidateStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, candidate: NewCandidate) -> Result<Candidate> {
        let created = self.store.create_candidate(candidate).await?;
        tracing::info!(candidate_id = %created.id, is_senior = created.is_senior, "Candidate registered");
        Ok(created)
    }

    /// Creates each row independently; one bad row does not stop the rest.
    pub async fn import(&self, rows: Vec<std::result::Result<NewCandidate, String>>) -> ImportReport {
        let mut report = ImportReport::default();
        let mut seen_emails = HashSet::new();

        for (index, row) in rows.into_iter().enumerate() {
            let candidate = match row {
                Ok(candidate) => candidate,
                Err(error) => {
                    report.failed.push(ImportFailure {
                        index,
                        email: String::new(),
                        error,
                    });
                    continue;
                }
            };

            if !seen_emails.insert(candidate.email.clone()) {
                report.failed.push(ImportFailure {
                    index,
                    email: candidate.email,
                    error: "Duplicate email in import".to_string(),
                });
                continue;
            }

            let email = candidate.email.clone();
            match self.store.create_candidate(candidate).await {
                Ok(created) => report.created.push(created.id),
                Err(e) => {
                    tracing::warn!(index, email = %email, error = %e, "Skipping import row");
                    report.failed.push(ImportFailure {
                        index,
                        email,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            created = report.created.len(),
            failed = report.failed.len(),
            "Candidate import finished"
        );
        report
    }

    pub async fn candidate(&self, id: Uuid) -> Result<Candidate> {
        self.store
            .get_candidate(id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))
    }

    pub async fn list(
        &self,
        filter: StatusFilter,
        sort: CandidateSort,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<CandidateListResponse> {
        let mut candidates = self.store.list_candidates(filter.status()).await?;
        if sort == CandidateSort::Progress {
            // stable, so newest-first is kept within a stage
            candidates.sort_by(|a, b| compare_by_progress(b.processed_status, a.processed_status));
        }

        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        let page = page.unwrap_or(1).max(1);
        let total_items = candidates.len() as u64;
        let total_pages = total_items.div_ceil(per_page as u64) as u32;

        let items = candidates
            .into_iter()
            .skip((page - 1).saturating_mul(per_page) as usize)
            .take(per_page as usize)
            .map(CandidateResponse::from)
            .collect();

        Ok(CandidateListResponse {
            items,
            metadata: Metadata {
                page,
                per_page,
                total_pages,
                total_items,
            },
        })
    }

    pub async fn stage_history(&self, candidate_id: Uuid) -> Result<StageHistoryResponse> {
        let candidate = self.candidate(candidate_id).await?;
        let mut stages = self.store.list_stages(candidate_id).await?;
        reorder_stages(&mut stages);

        let latest = latest_stage(&stages);
        let is_hired = stages.iter().any(|s| s.stage_key == CandidateStatus::Hired);
        let is_rejected = stages.iter().any(|s| s.stage_key == CandidateStatus::Rejected);

        Ok(StageHistoryResponse {
            candidate_id,
            is_senior: candidate.is_senior,
            latest_stage: latest,
            latest_stage_order: stage_order(latest),
            next_stage: next_status(candidate.processed_status, candidate.is_senior),
            is_hired,
            is_rejected,
            stages: stages.into_iter().map(StageView::from).collect(),
        })
    }

    /// Moves one candidate along its forward edge, honouring its seniority.
    pub async fn approve(&self, id: Uuid, note: String, actor: Option<Uuid>) -> Result<TransitionOutcome> {
        self.decide(id, Decision::Approve, note, false, actor).await
    }

    pub async fn reject(
        &self,
        id: Uuid,
        note: String,
        send_email_on_reject: bool,
        actor: Option<Uuid>,
    ) -> Result<TransitionOutcome> {
        self.decide(id, Decision::Reject, note, send_email_on_reject, actor)
            .await
    }

    async fn decide(
        &self,
        id: Uuid,
        decision: Decision,
        note: String,
        send_email_on_reject: bool,
        actor: Option<Uuid>,
    ) -> Result<TransitionOutcome> {
        let candidate = self.candidate(id).await?;
        let target = decision
            .resolve(candidate.processed_status, candidate.is_senior)
            .ok_or(BatchPlanError::NoTransition)?;

        tracing::info!(
            candidate_id = %id,
            from = %candidate.processed_status,
            to = %target,
            "Candidate decision"
        );

        self.persist(TransitionRequest {
            ids: vec![id],
            from: ExpectedStage::All(candidate.processed_status),
            note,
            target,
            send_email_on_reject,
            actor,
        })
        .await
    }

    /// Resolves the target once and applies it to the whole selection.
    #[allow(clippy::too_many_arguments)]
    pub async fn batch(
        &self,
        decision: Decision,
        filter: StatusFilter,
        is_senior: bool,
        ids: Vec<Uuid>,
        note: String,
        send_email_on_reject: bool,
        actor: Option<Uuid>,
    ) -> Result<TransitionOutcome> {
        let plan = BatchTransition::plan(decision, filter, is_senior, ids, note)?;

        tracing::info!(
            from = %plan.from,
            to = %plan.target,
            candidates = plan.ids.len(),
            "Batch decision"
        );

        self.persist(TransitionRequest {
            ids: plan.ids,
            from: ExpectedStage::All(plan.from),
            note: plan.note,
            target: plan.target,
            send_email_on_reject,
            actor,
        })
        .await
    }

    /// Explicit-target update. The target must be a legal edge (forward or
    /// rejection) for every existing candidate, otherwise nothing is written.
    pub async fn update_stages(
        &self,
        ids: Vec<Uuid>,
        note: String,
        target: CandidateStatus,
        actor: Option<Uuid>,
    ) -> Result<TransitionOutcome> {
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() {
            return Err(BatchPlanError::EmptySelection.into());
        }

        let candidates = self.store.get_candidates(ids.clone()).await?;
        let illegal: Vec<String> = candidates
            .iter()
            .filter(|c| {
                let forward = next_status(c.processed_status, c.is_senior);
                let reject = reject_target(c.processed_status);
                forward != Some(target) && reject != Some(target)
            })
            .map(|c| format!("{} ({} -> {})", c.id, c.processed_status, target))
            .collect();

        if !illegal.is_empty() {
            return Err(Error::InvalidTransition(format!(
                "Can't update recruitment process: {}",
                illegal.join(", ")
            )));
        }

        let observed: HashMap<Uuid, CandidateStatus> = candidates
            .iter()
            .map(|c| (c.id, c.processed_status))
            .collect();

        self.persist(TransitionRequest {
            ids,
            from: ExpectedStage::Each(observed),
            note,
            target,
            send_email_on_reject: false,
            actor,
        })
        .await
    }

    async fn persist(&self, request: TransitionRequest) -> Result<TransitionOutcome> {
        let expected = request.from.clone();
        let outcome = self.store.apply_transition(request).await?;
        if !outcome.stale.is_empty() {
            let stage = match expected {
                ExpectedStage::All(status) => format!(" {}", status),
                ExpectedStage::Each(_) => String::new(),
            };
            return Err(Error::InvalidTransition(format!(
                "Can't update recruitment process: {} candidate(s) not in the expected{} stage",
                outcome.stale.len(),
                stage
            )));
        }
        if !outcome.skipped.is_empty() {
            tracing::warn!(skipped = ?outcome.skipped, "Unknown candidate ids skipped");
        }
        if outcome.updated.is_empty() {
            return Err(Error::NotFound(
                "No valid candidate IDs found. Nothing updated.".into(),
            ));
        }
        Ok(outcome)
    }

    /// Candidates for the XLSX report. Explicit ids win over the filter.
    pub async fn export_candidates(
        &self,
        ids: Option<Vec<Uuid>>,
        filter: StatusFilter,
    ) -> Result<Vec<Candidate>> {
        match ids {
            Some(ids) if !ids.is_empty() => self.store.get_candidates(ids).await,
            _ => self.store.list_candidates(filter.status()).await,
        }
    }

    /// Count per status plus the `all` total, every status present.
    pub async fn status_counts(&self) -> Result<BTreeMap<String, i64>> {
        let counts = self.store.status_counts().await?;
        let mut items: BTreeMap<String, i64> = CandidateStatus::ALL
            .into_iter()
            .map(|status| (status.to_string(), counts.get(&status).copied().unwrap_or(0)))
            .collect();
        items.insert(StatusFilter::All.to_string(), counts.values().sum());
        Ok(items)
    }
}
