use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::candidate_dto::{CandidateListQuery, CandidateResponse, CreateCandidatePayload},
    dto::stage_dto::DecisionPayload,
    error::Result,
    extract::AppJson,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/candidates",
    request_body = CreateCandidatePayload,
    responses(
        (status = 201, description = "Candidate created", body = CandidateResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn create_candidate(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCandidatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate = state.pipeline_service.register(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(CandidateResponse::from(candidate))))
}

#[utoipa::path(
    get,
    path = "/api/candidates",
    params(
        ("filter_by" = Option<String>, Query, description = "Candidate status or `all`"),
        ("sort" = Option<String>, Query, description = "`newest` (default) or `progress`"),
        ("page" = Option<u32>, Query, description = "1-based page"),
        ("per_page" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Candidates page"),
        (status = 400, description = "Unknown status filter")
    )
)]
#[axum::debug_handler]
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(query): Query<CandidateListQuery>,
) -> Result<impl IntoResponse> {
    let page = state
        .pipeline_service
        .list(query.filter_by, query.sort, query.page, query.per_page)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate", body = CandidateResponse),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate = state.pipeline_service.candidate(id).await?;
    Ok(Json(CandidateResponse::from(candidate)))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}/stages",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Stage history in pipeline order"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_candidate_stages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let history = state.pipeline_service.stage_history(id).await?;
    Ok(Json(history))
}

#[utoipa::path(
    post,
    path = "/api/candidates/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = DecisionPayload,
    responses(
        (status = 200, description = "Candidate moved to the next stage"),
        (status = 404, description = "Candidate not found"),
        (status = 409, description = "No forward transition from the current stage")
    )
)]
#[axum::debug_handler]
pub async fn approve_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<DecisionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .pipeline_service
        .approve(id, payload.note, claims.actor_id())
        .await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/candidates/{id}/reject",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = DecisionPayload,
    responses(
        (status = 200, description = "Candidate rejected"),
        (status = 404, description = "Candidate not found"),
        (status = 409, description = "Candidate already hired or rejected")
    )
)]
#[axum::debug_handler]
pub async fn reject_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<DecisionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .pipeline_service
        .reject(id, payload.note, payload.send_email_on_reject, claims.actor_id())
        .await?;
    Ok(Json(outcome))
}
