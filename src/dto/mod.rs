pub mod candidate_dto;
pub mod stage_dto;
