use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::domain::user::models::PasswordLength;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

const OLD_PASSWORD_INCORRECT: &str = "Old password is incorrect";

#[derive(Debug, Deserialize)]
pub struct ResetPasswordQuery {
    pub email: String,
}

/// HTTP request body for changing a password (raw JSON)
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Query(query): Query<ResetPasswordQuery>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    PasswordLength::check(&body.old_password)
        .and_then(|_| PasswordLength::check(&body.new_password))
        .map_err(|e| ApiError::UnprocessableEntity(UserError::from(e).to_string()))?;

    let changed = state
        .auth_service
        .update_password(&query.email, &body.old_password, &body.new_password)
        .await
        .map_err(|e| match e {
            UserError::NotFound(_) => ApiError::BadRequest(OLD_PASSWORD_INCORRECT.to_string()),
            _ => ApiError::from(e),
        })?;

    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::BadRequest(OLD_PASSWORD_INCORRECT.to_string()))
    }
}
