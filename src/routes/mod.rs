pub mod candidate_routes;
pub mod export;
pub mod health;
pub mod recruitment;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{middleware::auth::require_hr_admin, AppState};

/// Full application router. Everything under `/api` requires an HR admin token.
pub fn router(state: AppState) -> Router {
    let base_routes = Router::new().route("/health", get(health::health));

    let api = Router::new()
        .route(
            "/api/candidates",
            get(candidate_routes::list_candidates).post(candidate_routes::create_candidate),
        )
        .route("/api/candidates/:id", get(candidate_routes::get_candidate))
        .route(
            "/api/candidates/:id/stages",
            get(candidate_routes::get_candidate_stages),
        )
        .route(
            "/api/candidates/:id/approve",
            post(candidate_routes::approve_candidate),
        )
        .route(
            "/api/candidates/:id/reject",
            post(candidate_routes::reject_candidate),
        )
        .route(
            "/api/recruitment/import",
            post(recruitment::import_candidates),
        )
        .route(
            "/api/recruitment/batch/approve",
            post(recruitment::batch_approve),
        )
        .route(
            "/api/recruitment/batch/reject",
            post(recruitment::batch_reject),
        )
        .route(
            "/api/recruitment/update-stages",
            post(recruitment::update_stages),
        )
        .route(
            "/api/recruitment/stats/count",
            get(recruitment::count_by_status),
        )
        .route("/api/recruitment/stages", get(recruitment::list_flow))
        .route("/api/recruitment/next", get(recruitment::next_status_preview))
        .route("/api/recruitment/export", post(export::export_pipeline))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_hr_admin,
        ));

    base_routes.merge(api).with_state(state)
}
