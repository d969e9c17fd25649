use axum::extract::FromRequest;

use crate::error::Error;

/// `axum::Json` whose rejections (bad syntax, unknown enum values, missing
/// fields) come back as 400 with the usual `{"error": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);
