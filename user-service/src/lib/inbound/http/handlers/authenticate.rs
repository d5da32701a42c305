use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::get_current_user::UserData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn authenticate(
    State(state): State<AppState>,
    Json(body): Json<AuthenticateRequestBody>,
) -> Result<ApiSuccess<AuthenticateResponseData>, ApiError> {
    // Unknown emails answer like wrong passwords
    let user = state
        .auth_service
        .authenticate(&body.email, &body.password)
        .await
        .map_err(|e| match e {
            UserError::NotFound(_) => ApiError::Unauthorized("Invalid credentials".to_string()),
            _ => ApiError::from(e),
        })?;

    let token = state.token_issuer.issue(&user).map_err(|e| {
        tracing::error!(user_id = %user.id, error = %e, "Token generation failed");
        ApiError::InternalServerError(format!("Token generation failed: {}", e))
    })?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        AuthenticateResponseData {
            user: (&user).into(),
            token,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthenticateRequestBody {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticateResponseData {
    pub user: UserData,
    pub token: String,
}
