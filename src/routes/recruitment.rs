use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::{json, Value as JsonValue};
use validator::Validate;

use crate::{
    dto::candidate_dto::CreateCandidatePayload,
    dto::stage_dto::{
        BatchDecisionPayload, CandidateStageUpdate, FlowQuery, NextStatusQuery, NextStatusResponse,
    },
    error::{Error, Result},
    extract::AppJson,
    middleware::auth::Claims,
    models::candidate::NewCandidate,
    pipeline::{next_status_of, recruitment_flow, stage_order_of, Decision},
    AppState,
};

pub const MAX_IMPORT_ROWS: usize = 1000;

fn parse_import_row(row: JsonValue) -> std::result::Result<NewCandidate, String> {
    let payload: CreateCandidatePayload = serde_json::from_value(row).map_err(|e| e.to_string())?;
    payload.validate().map_err(|e| e.to_string())?;
    Ok(payload.into())
}

#[utoipa::path(
    post,
    path = "/api/recruitment/import",
    request_body = Vec<CreateCandidatePayload>,
    responses(
        (status = 200, description = "Created ids and per-row failures"),
        (status = 400, description = "Empty or oversized import")
    )
)]
#[axum::debug_handler]
pub async fn import_candidates(
    State(state): State<AppState>,
    AppJson(rows): AppJson<Vec<JsonValue>>,
) -> Result<impl IntoResponse> {
    if rows.is_empty() {
        return Err(Error::BadRequest("Import must contain at least one candidate".into()));
    }
    if rows.len() > MAX_IMPORT_ROWS {
        return Err(Error::BadRequest(format!(
            "Import is limited to {} candidates",
            MAX_IMPORT_ROWS
        )));
    }

    let parsed = rows.into_iter().map(parse_import_row).collect();
    let report = state.pipeline_service.import(parsed).await;
    Ok(Json(report))
}

async fn batch_decision(
    state: AppState,
    claims: Claims,
    decision: Decision,
    payload: BatchDecisionPayload,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .pipeline_service
        .batch(
            decision,
            payload.filter_by,
            payload.is_senior,
            payload.ids,
            payload.note,
            payload.send_email_on_reject,
            claims.actor_id(),
        )
        .await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/recruitment/batch/approve",
    request_body = BatchDecisionPayload,
    responses(
        (status = 200, description = "Selected candidates moved to the next stage"),
        (status = 400, description = "No filter or no candidates selected"),
        (status = 409, description = "Filter stage has no forward transition")
    )
)]
#[axum::debug_handler]
pub async fn batch_approve(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<BatchDecisionPayload>,
) -> Result<impl IntoResponse> {
    batch_decision(state, claims, Decision::Approve, payload).await
}

#[utoipa::path(
    post,
    path = "/api/recruitment/batch/reject",
    request_body = BatchDecisionPayload,
    responses(
        (status = 200, description = "Selected candidates rejected"),
        (status = 400, description = "No filter or no candidates selected"),
        (status = 409, description = "Filter stage is terminal")
    )
)]
#[axum::debug_handler]
pub async fn batch_reject(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<BatchDecisionPayload>,
) -> Result<impl IntoResponse> {
    batch_decision(state, claims, Decision::Reject, payload).await
}

#[utoipa::path(
    post,
    path = "/api/recruitment/update-stages",
    request_body = CandidateStageUpdate,
    responses(
        (status = 200, description = "Candidates moved to the requested stage"),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Requested stage is not reachable for some candidates")
    )
)]
#[axum::debug_handler]
pub async fn update_stages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CandidateStageUpdate>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .pipeline_service
        .update_stages(
            payload.id,
            payload.note,
            payload.candidate_status,
            claims.actor_id(),
        )
        .await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/api/recruitment/stats/count",
    responses(
        (status = 200, description = "Candidate count per status, plus `all`")
    )
)]
#[axum::debug_handler]
pub async fn count_by_status(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let items = state.pipeline_service.status_counts().await?;
    Ok(Json(json!({ "items": items })))
}

#[utoipa::path(
    get,
    path = "/api/recruitment/stages",
    params(
        ("is_senior" = Option<bool>, Query, description = "Drop the team-lead interview when false")
    ),
    responses(
        (status = 200, description = "Recruitment flow dictionary")
    )
)]
#[axum::debug_handler]
pub async fn list_flow(Query(query): Query<FlowQuery>) -> impl IntoResponse {
    let include_team_lead = query.is_senior.unwrap_or(true);
    Json(json!({ "items": recruitment_flow(include_team_lead) }))
}

#[utoipa::path(
    get,
    path = "/api/recruitment/next",
    params(
        ("status" = String, Query, description = "Current status text"),
        ("is_senior" = Option<bool>, Query, description = "Seniority of the candidate")
    ),
    responses(
        (status = 200, description = "Stage order and next status; unknown text has order 0 and no next status")
    )
)]
#[axum::debug_handler]
pub async fn next_status_preview(Query(query): Query<NextStatusQuery>) -> impl IntoResponse {
    let status = query.status.trim().to_string();
    Json(NextStatusResponse {
        stage_order: stage_order_of(&status),
        next_status: next_status_of(&status, query.is_senior),
        status,
    })
}
