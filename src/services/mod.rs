pub mod candidate_service;
pub mod candidate_store;
pub mod export_service;
pub mod notification_service;
pub mod pipeline_service;
