pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::services::{candidate_store::CandidateStore, pipeline_service::PipelineService};

#[derive(Clone)]
pub struct AppState {
    pub pipeline_service: PipelineService,
    pub jwt_secret: Arc<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn CandidateStore>, jwt_secret: impl Into<String>) -> Self {
        Self {
            pipeline_service: PipelineService::new(store),
            jwt_secret: Arc::new(jwt_secret.into()),
        }
    }
}
