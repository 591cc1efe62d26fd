use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::{CurrentUser, User};
use crate::services::accounts::{self, LoginToken};
use crate::AppState;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = accounts::register(&state.db, body.username.trim(), &body.password).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<LoginToken>>, AppError> {
    let token = accounts::login(
        &state.db,
        body.username.trim(),
        &body.password,
        state.config.session_ttl_hours,
    )
    .await?;

    Ok(Json(ApiResponse::ok(token)))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    accounts::logout(&state.db, &user).await?;
    Ok(Json(ApiResponse::ok(())))
}

/// GET /api/auth/me
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<ApiResponse<CurrentUser>> {
    Json(ApiResponse::ok(user))
}
