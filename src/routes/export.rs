use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::Result, extract::AppJson, pipeline::StatusFilter,
    services::export_service::ExportService, AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct PipelineExportRequest {
    pub candidate_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub filter_by: StatusFilter,
}

/// Export the pipeline (selected ids, or everyone under `filter_by`) as XLSX
#[utoipa::path(
    post,
    path = "/api/recruitment/export",
    responses(
        (status = 200, description = "XLSX workbook with Candidates and Funnel sheets")
    )
)]
#[axum::debug_handler]
pub async fn export_pipeline(
    State(state): State<AppState>,
    AppJson(payload): AppJson<PipelineExportRequest>,
) -> Result<impl IntoResponse> {
    let candidates = state
        .pipeline_service
        .export_candidates(payload.candidate_ids, payload.filter_by)
        .await?;

    tracing::info!(candidates = candidates.len(), filter = %payload.filter_by, "Exporting pipeline");

    let buffer = ExportService::generate_pipeline_xlsx(&candidates)?;
    let filename = format!(
        "recruitment_pipeline_{}.xlsx",
        chrono::Utc::now().format("%Y%m%d")
    );
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}
