use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    AppState,
};

pub const HR_ADMIN_ROLE: &str = "hr_admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

impl Claims {
    /// The HR user behind the request, when `sub` is a UUID.
    pub fn actor_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

fn unauthorized(code: &str) -> Error {
    Error::Unauthorized(code.to_string())
}

fn bearer_claims(req: &Request, secret: &str) -> Result<Claims> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(unauthorized("missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(unauthorized("bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(unauthorized("unsupported_scheme"));
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| unauthorized("invalid_token"))
}

/// Only HR admins may move candidates through the pipeline.
pub async fn require_hr_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let claims = match bearer_claims(&req, &state.jwt_secret) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    let role = claims.role.clone().unwrap_or_default();
    if !role.eq_ignore_ascii_case(HR_ADMIN_ROLE) {
        tracing::warn!(sub = %claims.sub, role = %role, "Rejected non-admin request");
        return Error::Forbidden("forbidden".to_string()).into_response();
    }

    req.extensions_mut().insert(claims);
    next.run(req).await
}
