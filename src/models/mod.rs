pub mod candidate;
pub mod notification;
